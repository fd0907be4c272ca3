use console_cmd::ConsoleCmd;
use console_input::console_input_thread;
use msgs::config;
use philosopher::ClientPhilosopher;

mod console_cmd;
mod console_input;
mod philosopher;

#[tokio::main]
async fn main() {
    let mut number_of_philosophers: usize = 0;
    let mut console_receiver = console_input_thread();

    loop {
        // Until the table is viable, the first add has to bring it to the
        // minimum; afterwards philosophers can join one by one.
        let min_to_add = if number_of_philosophers >= config::MIN_PHILOSOPHERS {
            1
        } else {
            config::MIN_PHILOSOPHERS
        };
        let seats_left = config::MAX_PHILOSOPHERS - number_of_philosophers;

        println!(
            "\nPhilosophers around the table: {number_of_philosophers} / {} (seats left: {seats_left})",
            config::MAX_PHILOSOPHERS
        );
        println!(
            "Type 'add <number>' to add philosophers ({min_to_add} to {seats_left}) or 'quit' to stop the program."
        );

        let Some(console_str) = console_receiver.recv().await else {
            break;
        };

        match ConsoleCmd::parse(console_str.trim()) {
            Ok(ConsoleCmd::Add(number)) => {
                if number < min_to_add || number > seats_left {
                    println!("cannot add {number} philosophers (allowed: {min_to_add} to {seats_left})");
                    continue;
                }
                number_of_philosophers += add_philosophers(number).await;
            }
            Ok(ConsoleCmd::Quit) => {
                println!("Closing the program and the philosophers...");
                break;
            }
            Err(err) => println!("err: {err}"),
        }
    }
}

async fn add_philosophers(number: usize) -> usize {
    println!(
        "Adding {number} philosopher{}..",
        if number > 1 { "s" } else { "" }
    );

    let mut added = 0;
    for _ in 0..number {
        let philosopher = match ClientPhilosopher::connect().await {
            Ok(philosopher) => philosopher,
            Err(e) => {
                println!("error while connecting a philosopher: {e}");
                break;
            }
        };

        let id = philosopher.id();
        println!("Philosopher {id} created and connected successfully.");

        tokio::spawn(async move {
            if let Err(e) = philosopher.run().await {
                println!("philosopher {id} stopped: {e}");
            }
        });

        added += 1;
    }

    added
}
