use std::io::Write;

use anyhow::Result;

use crate::hexdump::hex_rows;
use crate::protocol::DisasmRequest;
use crate::transport::Transport;

/// Submit `bytes` once and print the listing to `out`.
///
/// With `verbose`, the hex dump is printed before the request goes out, and
/// the status code and raw body are printed before the body is parsed, so a
/// malformed response is visible even though it aborts the session.
pub fn run<W: Write, T: Transport>(out: &mut W, transport: &T, bytes: &[u8], verbose: bool) -> Result<()> {
    if verbose {
        writeln!(out, "Bytes:")?;
        for row in hex_rows(bytes) {
            writeln!(out, "{row}")?;
        }
        writeln!(out)?;
        out.flush()?;
    }

    let raw = transport.post(&DisasmRequest { data: bytes })?;
    if verbose {
        writeln!(out, "{}", raw.status)?;
        writeln!(out, "{}", raw.body)?;
        out.flush()?;
    }

    for line in raw.disassembly()? {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::protocol::RawResponse;
    use crate::ClientError;

    /// Output sink the transport can peek at while a request is in flight.
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Replays a canned response, records every request body it sees and
    /// what had been printed when the request went out.
    struct Canned {
        status: u16,
        body: &'static str,
        out: Shared,
        sent: RefCell<Vec<String>>,
        printed_before_post: RefCell<Option<String>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                out: Shared::default(),
                sent: RefCell::new(Vec::new()),
                printed_before_post: RefCell::new(None),
            }
        }
    }

    impl Transport for Canned {
        fn post(&self, request: &DisasmRequest<'_>) -> Result<RawResponse, ClientError> {
            *self.printed_before_post.borrow_mut() = Some(self.out.text());
            self.sent.borrow_mut().push(serde_json::to_string(request).unwrap());
            Ok(RawResponse { status: self.status, body: self.body.to_string() })
        }
    }

    fn run_to_string(t: &Canned, bytes: &[u8], verbose: bool) -> (Result<()>, String) {
        let mut out = t.out.clone();
        let res = run(&mut out, t, bytes, verbose);
        (res, t.out.text())
    }

    #[test]
    fn empty_input_prints_nothing() {
        let t = Canned::new(200, r#"{"disassembly": []}"#);
        let (res, out) = run_to_string(&t, &[], false);
        res.unwrap();
        assert_eq!(out, "");
        assert_eq!(*t.sent.borrow(), vec![r#"{"data":[]}"#.to_string()]);
    }

    #[test]
    fn lines_are_printed_in_order() {
        let t = Canned::new(200, r#"{"disassembly": ["0000   A9 BD         LDA #$BD", "0002   00            BRK"]}"#);
        let (res, out) = run_to_string(&t, &[0xA9, 0xBD, 0x00], false);
        res.unwrap();
        assert_eq!(out, "0000   A9 BD         LDA #$BD\n0002   00            BRK\n");
        assert_eq!(t.sent.borrow().len(), 1);
    }

    #[test]
    fn verbose_dumps_bytes_then_status_and_body() {
        let body = r#"{"disassembly": ["0000   00            BRK"]}"#;
        let t = Canned::new(200, body);
        let (res, out) = run_to_string(&t, &[0x00, 0x01], true);
        res.unwrap();
        let expected = format!("Bytes:\n00 01\n\n200\n{body}\n0000   00            BRK\n");
        assert_eq!(out, expected);
        assert_eq!(t.printed_before_post.borrow().as_deref(), Some("Bytes:\n00 01\n\n"));
    }

    #[test]
    fn quiet_mode_prints_nothing_before_the_request() {
        let t = Canned::new(200, r#"{"disassembly": []}"#);
        let (res, _) = run_to_string(&t, &[0x00, 0x01], false);
        res.unwrap();
        assert_eq!(t.printed_before_post.borrow().as_deref(), Some(""));
    }

    #[test]
    fn malformed_body_is_shown_then_fails() {
        let t = Canned::new(500, "internal error");
        let (res, out) = run_to_string(&t, &[0xEA], true);
        let err = res.unwrap_err();
        assert!(matches!(err.downcast_ref::<ClientError>(), Some(ClientError::Protocol { status: 500, .. })));
        assert!(out.ends_with("500\ninternal error\n"), "{out}");
    }

    #[test]
    fn quiet_mode_fails_on_missing_field() {
        let t = Canned::new(200, r#"{"listing": []}"#);
        let (res, out) = run_to_string(&t, &[0xEA], false);
        assert!(res.is_err());
        assert_eq!(out, "");
    }
}
