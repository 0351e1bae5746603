//! Incremental parser for the detector's `multipart/x-mixed-replace` video
//! stream.
//!
//! The server emits parts of the form
//! `--frame\r\nContent-Type: image/jpeg\r\n\r\n<jpeg bytes>\r\n` with no
//! `Content-Length`, so a frame only ends where the next boundary begins.
//! Chunks off the wire may split a part anywhere, including inside the
//! boundary marker itself.

pub const DEFAULT_BOUNDARY: &str = "frame";

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Extracts the `boundary` parameter from a `multipart/x-mixed-replace`
/// content type, e.g. `multipart/x-mixed-replace; boundary=frame`.
pub fn boundary_from_content_type(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let token = part.strip_prefix("boundary=")?.trim_matches('"');
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    })
}

#[derive(Debug)]
pub struct FrameParser {
    marker: Vec<u8>,
    buf: Vec<u8>,
}

impl FrameParser {
    pub fn new(boundary: &str) -> Self {
        let mut marker = b"--".to_vec();
        marker.extend_from_slice(boundary.as_bytes());
        Self {
            marker,
            buf: Vec::new(),
        }
    }

    /// Feeds one chunk from the wire and returns every frame it completes.
    /// Part headers are skipped; the payload is returned with the trailing
    /// CRLF stripped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();

        loop {
            let Some(start) = find(&self.buf, &self.marker) else {
                // No boundary anywhere: only a marker prefix at the tail can
                // still become one, the rest is preamble to discard.
                let keep = self.marker.len() - 1;
                if self.buf.len() > keep {
                    self.buf.drain(..self.buf.len() - keep);
                }
                break;
            };

            let headers_from = start + self.marker.len();
            let Some(headers_len) = find(&self.buf[headers_from..], HEADER_TERMINATOR) else {
                self.buf.drain(..start);
                break;
            };

            let body_from = headers_from + headers_len + HEADER_TERMINATOR.len();
            let Some(body_len) = find(&self.buf[body_from..], &self.marker) else {
                self.buf.drain(..start);
                break;
            };

            let mut body = self.buf[body_from..body_from + body_len].to_vec();
            while body.ends_with(b"\r") || body.ends_with(b"\n") {
                body.pop();
            }
            if !body.is_empty() {
                frames.push(body);
            }
            self.buf.drain(..body_from + body_len);
        }

        frames
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
#[path = "tests/mjpeg_tests.rs"]
mod tests;
