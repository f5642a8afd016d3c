/// One decoded event of an OpenAI chat-completions stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseEvent {
    Delta(String),
    Done,
}

/// Incremental Server-Sent Events decoder. Chunks may split events anywhere,
/// so bytes are buffered until a blank-line event terminator arrives.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = memchr::memmem::find(&self.buf, b"\n\n") {
            let part: Vec<u8> = self.buf.drain(..pos + 2).collect();
            let Ok(text) = String::from_utf8(part) else {
                tracing::debug!("skipping non-utf8 SSE event");
                continue;
            };
            for line in text.lines() {
                let line = line.trim_start();
                let Some(rest) = line.strip_prefix("data:") else {
                    continue;
                };
                let rest = rest.trim();
                if rest == "[DONE]" {
                    events.push(SseEvent::Done);
                    continue;
                }
                match serde_json::from_str::<serde_json::Value>(rest) {
                    Ok(v) => {
                        if let Some(delta) = v["choices"][0]["delta"]["content"].as_str() {
                            if !delta.is_empty() {
                                events.push(SseEvent::Delta(delta.to_string()));
                            }
                        }
                    }
                    Err(e) => tracing::debug!("SSE JSON parse error on {rest}: {e}"),
                }
            }
        }
        events
    }
}
