use anyhow::bail;

pub enum ConsoleCmd {
    Add(usize),
    Quit,
}

impl ConsoleCmd {
    pub fn parse(input: &str) -> anyhow::Result<ConsoleCmd> {
        let (command, rem) = match input.find(' ') {
            Some(i) => (&input[..i], input[i + 1..].trim()),
            None => (input, ""),
        };

        match command {
            "add" => {
                let number = rem.parse()?;
                Ok(ConsoleCmd::Add(number))
            }
            "quit" => Ok(ConsoleCmd::Quit),
            _ => bail!("cmd not recognized"),
        }
    }
}

#[cfg(test)]
#[path = "console_cmd_tests.rs"]
mod tests;
