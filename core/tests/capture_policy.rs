use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use rpc_core::trace;
use tracing::Level;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Detection runs once per process, so this binary holds a single test.
#[test]
fn detection_logged_once() {
    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let (first, second) = tracing::subscriber::with_default(subscriber, || {
        (trace::capture_policy(), trace::capture_policy())
    });

    assert_eq!(first, second);

    let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
    let events: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("trace.capture_resolved"))
        .collect();
    assert_eq!(events.len(), 1, "{output}");
    assert!(events[0].contains("DEBUG"));
    assert!(events[0].contains(&format!("capture={first:?}")));
}
