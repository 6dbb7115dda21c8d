const PING_PREFIX: &str = "PING :";

/// True iff the line starts with the literal `PING :`
pub fn is_ping(line: &str) -> bool {
    line.starts_with(PING_PREFIX)
}

/// Build the reply for a PING line: `PONG :` plus the ping payload up to
/// the end of its first line. The caller adds the CR LF terminator.
pub fn build_pong(line: &str) -> String {
    let payload = line.strip_prefix(PING_PREFIX).unwrap_or(line);
    let payload = match payload.find(['\r', '\n']) {
        Some(end) => &payload[..end],
        None => payload,
    };
    format!("PONG :{}", payload)
}

/// `Some(pong)` when `line` is a PING, `None` otherwise
pub fn pong_for(line: &str) -> Option<String> {
    is_ping(line).then(|| build_pong(line))
}
