use super::*;

fn part(body: &[u8]) -> Vec<u8> {
    let mut out = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
    out.extend_from_slice(body);
    out.extend_from_slice(b"\r\n");
    out
}

#[test]
fn parses_a_single_part() {
    let mut parser = FrameParser::new("frame");
    let mut wire = part(b"\xff\xd8first-frame\xff\xd9");
    // The closing boundary of a frame is the opening boundary of the next.
    wire.extend_from_slice(b"--frame");

    let frames = parser.push(&wire);
    assert_eq!(frames, vec![b"\xff\xd8first-frame\xff\xd9".to_vec()]);
}

#[test]
fn parses_back_to_back_parts_in_one_chunk() {
    let mut parser = FrameParser::new("frame");
    let mut wire = part(b"one");
    wire.extend_from_slice(&part(b"two"));
    wire.extend_from_slice(b"--frame");

    let frames = parser.push(&wire);
    assert_eq!(frames, vec![b"one".to_vec(), b"two".to_vec()]);
}

#[test]
fn reassembles_parts_split_at_every_byte() {
    let mut wire = part(b"\xff\xd8split-frame\xff\xd9");
    wire.extend_from_slice(&part(b"\xff\xd8second\xff\xd9"));
    wire.extend_from_slice(b"--frame");

    let mut parser = FrameParser::new("frame");
    let mut frames = Vec::new();
    for byte in &wire {
        frames.extend(parser.push(std::slice::from_ref(byte)));
    }
    assert_eq!(
        frames,
        vec![
            b"\xff\xd8split-frame\xff\xd9".to_vec(),
            b"\xff\xd8second\xff\xd9".to_vec(),
        ]
    );
}

#[test]
fn holds_an_unterminated_part_until_the_next_boundary() {
    let mut parser = FrameParser::new("frame");
    assert!(parser.push(&part(b"pending")).is_empty());

    let frames = parser.push(b"--frame\r\n");
    assert_eq!(frames, vec![b"pending".to_vec()]);
}

#[test]
fn skips_preamble_before_the_first_boundary() {
    let mut parser = FrameParser::new("frame");
    let mut wire = b"HTTP noise that is not a part".to_vec();
    wire.extend_from_slice(&part(b"payload"));
    wire.extend_from_slice(b"--frame");

    let frames = parser.push(&wire);
    assert_eq!(frames, vec![b"payload".to_vec()]);
}

#[test]
fn frame_bodies_may_contain_crlf_sequences() {
    let mut parser = FrameParser::new("frame");
    let mut wire = part(b"body\r\nwith\r\nbreaks");
    wire.extend_from_slice(b"--frame");

    let frames = parser.push(&wire);
    assert_eq!(frames, vec![b"body\r\nwith\r\nbreaks".to_vec()]);
}

#[test]
fn extracts_boundary_from_content_type() {
    assert_eq!(
        boundary_from_content_type("multipart/x-mixed-replace; boundary=frame"),
        Some("frame".to_string())
    );
    assert_eq!(
        boundary_from_content_type("multipart/x-mixed-replace;boundary=\"cam\""),
        Some("cam".to_string())
    );
    assert_eq!(boundary_from_content_type("image/jpeg"), None);
    assert_eq!(
        boundary_from_content_type("multipart/x-mixed-replace; boundary="),
        None
    );
}
