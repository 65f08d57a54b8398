use pretty_assertions::assert_eq;

use super::*;

#[test]
fn buffer_handler_appends_newline_per_line() {
    let handler = BufferPrintHandler::new();
    handler.println("hello");
    handler.println("world");
    assert_eq!(handler.get_output(), "hello\nworld\n");
}

#[test]
fn buffer_handler_clear_empties_buffer() {
    let handler = buffer_handler();
    handler.println("hello");
    handler.clear();
    assert!(handler.get_output().is_empty());
}

#[test]
fn stdout_and_silent_capture_nothing() {
    assert_eq!(stdout_handler().get_output(), "");
    let silent = silent_handler();
    silent.println("dropped");
    assert_eq!(silent.get_output(), "");
}

#[test]
fn shared_handler_is_usable_from_another_thread() {
    let handler = buffer_handler();
    let writer = Arc::clone(&handler);
    let joined = std::thread::spawn(move || {
        for _ in 0..10 {
            writer.println("x");
        }
    })
    .join();
    assert!(joined.is_ok());
    assert_eq!(handler.get_output().lines().count(), 10);
}
