//! Interaction loop: read an identifier, send it, report the reply.
//!
//! Strictly half-duplex: one request, then one blocking receive, then the
//! next prompt. A malformed entry ends the whole session rather than
//! re-prompting, so the tool fails fast when driven by a script.

use crate::codec::{self, Reply};
use crate::session::Session;
use std::io::{self, BufRead, Read, Write};
use tracing::debug;

const PROMPT: &str = "Enter an unsigned 64-bit integer: ";

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Peer closed the connection.
    Closed,
    /// The input source ran out before the peer closed.
    InputExhausted,
    /// Malformed identifier on input; nothing was sent for it.
    InvalidInput,
    /// Transport failure during send or receive.
    TransportFailed,
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Closed | Outcome::InputExhausted => 0,
            Outcome::InvalidInput | Outcome::TransportFailed => 1,
        }
    }
}

/// Drive the read-validate-send-receive-report cycle until the session ends.
///
/// All fatal conditions are reported at the point of detection; only the
/// resulting outcome propagates. Errors writing to `output` itself bubble up
/// as `io::Error`.
pub fn run<R, W, S>(
    input: &mut R,
    output: &mut W,
    session: &mut Session<S>,
) -> io::Result<Outcome>
where
    R: BufRead,
    W: Write,
    S: Read + Write,
{
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("input exhausted");
            return Ok(Outcome::InputExhausted);
        }

        // Validation happens here against the raw text; the codec only ever
        // sees an in-range u64.
        let id = match line.trim().parse::<u64>() {
            Ok(id) => id,
            Err(e) => {
                writeln!(output, "Invalid input: {}", e)?;
                return Ok(Outcome::InvalidInput);
            }
        };

        let frame = codec::encode_identifier(id);
        writeln!(output, "Sending: {}", codec::hex_bytes(&frame))?;

        if let Err(e) = session.send(&frame) {
            writeln!(output, "{}", e)?;
            return Ok(Outcome::TransportFailed);
        }

        let payload = match session.receive() {
            Ok(p) => p,
            Err(e) => {
                writeln!(output, "{}", e)?;
                return Ok(Outcome::TransportFailed);
            }
        };

        match codec::classify(payload) {
            Reply::Closed => {
                writeln!(output, "Server closed the connection.")?;
                return Ok(Outcome::Closed);
            }
            Reply::Address { value, dotted } => {
                writeln!(output, "Received raw integer: {}", value)?;
                writeln!(output, "Received IP address: {}", dotted)?;
            }
            Reply::Unexpected(raw) => {
                writeln!(
                    output,
                    "Received unexpected data length ({} bytes): {}",
                    raw.len(),
                    codec::hex_bytes(&raw)
                )?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory transport yielding one scripted reply per receive call.
    struct ScriptedStream {
        replies: VecDeque<Vec<u8>>,
        written: Vec<u8>,
        fail_next_read: bool,
    }

    impl ScriptedStream {
        fn new(replies: Vec<Vec<u8>>) -> Self {
            ScriptedStream {
                replies: replies.into(),
                written: Vec::new(),
                fail_next_read: false,
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.fail_next_read {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            match self.replies.pop_front() {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_scripted(input: &str, replies: Vec<Vec<u8>>) -> (Outcome, Vec<u8>, String) {
        let mut session = Session::over(ScriptedStream::new(replies), 1024);
        let mut output = Vec::new();
        let outcome = run(&mut input.as_bytes(), &mut output, &mut session).unwrap();
        let written = session.stream().written.clone();
        (outcome, written, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_address_reply_then_input_exhausted() {
        let (outcome, written, output) = run_scripted("1\n", vec![vec![8, 8, 8, 8]]);
        assert_eq!(outcome, Outcome::InputExhausted);
        assert_eq!(written, vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert!(output.contains("Sending: 00 00 00 00 00 00 00 01"));
        assert!(output.contains("Received raw integer: 134744072"));
        assert!(output.contains("Received IP address: 8.8.8.8"));
    }

    #[test]
    fn test_out_of_range_identifier_is_fatal_before_send() {
        // 2^64 does not fit in a u64.
        let (outcome, written, output) =
            run_scripted("18446744073709551616\n", vec![vec![8, 8, 8, 8]]);
        assert_eq!(outcome, Outcome::InvalidInput);
        assert!(written.is_empty());
        assert!(output.contains("Invalid input:"));
    }

    #[test]
    fn test_non_numeric_input_is_fatal_before_send() {
        let (outcome, written, _) = run_scripted("not-a-number\n", vec![]);
        assert_eq!(outcome, Outcome::InvalidInput);
        assert!(written.is_empty());
    }

    #[test]
    fn test_negative_input_is_fatal_before_send() {
        let (outcome, written, _) = run_scripted("-1\n", vec![]);
        assert_eq!(outcome, Outcome::InvalidInput);
        assert!(written.is_empty());
    }

    #[test]
    fn test_zero_length_reply_closes_session() {
        // Second input line must never be consumed.
        let (outcome, written, output) = run_scripted("5\n7\n", vec![vec![]]);
        assert_eq!(outcome, Outcome::Closed);
        assert_eq!(written.len(), 8);
        assert!(output.contains("Server closed the connection."));
        assert_eq!(output.matches(PROMPT).count(), 1);
    }

    #[test]
    fn test_unexpected_length_keeps_looping() {
        let (outcome, written, output) =
            run_scripted("2\n3\n", vec![vec![0xAB, 0xCD], vec![10, 0, 0, 1]]);
        assert_eq!(outcome, Outcome::InputExhausted);
        // Both identifiers went out.
        assert_eq!(written.len(), 16);
        assert!(output.contains("Received unexpected data length (2 bytes): ab cd"));
        assert!(output.contains("Received IP address: 10.0.0.1"));
        assert_eq!(output.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_max_identifier_round_trips() {
        let (outcome, written, _) =
            run_scripted("18446744073709551615\n", vec![vec![1, 2, 3, 4]]);
        assert_eq!(outcome, Outcome::InputExhausted);
        assert_eq!(written, vec![0xFF; 8]);
    }

    #[test]
    fn test_receive_failure_is_fatal() {
        let mut stream = ScriptedStream::new(vec![]);
        stream.fail_next_read = true;
        let mut session = Session::over(stream, 1024);
        let mut output = Vec::new();
        let outcome = run(&mut "9\n".as_bytes(), &mut output, &mut session).unwrap();
        assert_eq!(outcome, Outcome::TransportFailed);
        assert!(String::from_utf8(output).unwrap().contains("Receive failed:"));
    }

    #[test]
    fn test_input_exhaustion_is_distinct_from_peer_closure() {
        // Peer closure and a drained input source both exit 0 but report
        // differently.
        let (closed, _, _) = run_scripted("5\n", vec![vec![]]);
        assert_eq!(closed, Outcome::Closed);

        let (exhausted, _, _) = run_scripted("", vec![]);
        assert_eq!(exhausted, Outcome::InputExhausted);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Closed.exit_code(), 0);
        assert_eq!(Outcome::InputExhausted.exit_code(), 0);
        assert_eq!(Outcome::InvalidInput.exit_code(), 1);
        assert_eq!(Outcome::TransportFailed.exit_code(), 1);
    }
}
