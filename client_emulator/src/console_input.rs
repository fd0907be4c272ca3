use std::io::stdin;
use std::thread;

use tokio::sync::mpsc::{self, Receiver};

/// Reads stdin on a dedicated thread and hands the lines over to the
/// async side. The thread ends with the process.
pub fn console_input_thread() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel(100);
    thread::spawn(move || pollster::block_on(console_input_loop(sender)));
    receiver
}

async fn console_input_loop(sender: mpsc::Sender<String>) {
    loop {
        let mut input = String::new();
        if stdin().read_line(&mut input).is_err() {
            break;
        }
        if sender.send(input).await.is_err() {
            break;
        }
    }
}
