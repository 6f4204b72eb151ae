use std::env;

#[derive(Debug)]
pub enum Command {
    Serve(ServeArgs),
    Submit(SubmitArgs),
}

#[derive(Debug, Default)]
pub struct ServeArgs {
    pub port: Option<u16>,
    pub no_open: bool,
}

#[derive(Debug, Default)]
pub struct SubmitArgs {
    pub server: Option<String>,
    pub user: Option<String>,
    pub token_count: Option<i64>,
    pub cost: Option<f64>,
    pub date: Option<String>,
    pub device: Option<String>,
}

pub fn parse_args() -> Result<Command, String> {
    let mut args = env::args().skip(1);
    let command = match args.next() {
        Some(name) => name,
        None => return Err("missing command (serve or submit)".to_string()),
    };

    match command.as_str() {
        "serve" => parse_serve(args).map(Command::Serve),
        "submit" => parse_submit(args).map(Command::Submit),
        "--help" | "-h" | "help" => {
            print_help();
            std::process::exit(0);
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_serve(mut args: impl Iterator<Item = String>) -> Result<ServeArgs, String> {
    let mut parsed = ServeArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = next_value(&mut args, "--port")?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--no-open" => {
                parsed.no_open = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

fn parse_submit(mut args: impl Iterator<Item = String>) -> Result<SubmitArgs, String> {
    let mut parsed = SubmitArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--server" => parsed.server = Some(next_value(&mut args, "--server")?),
            "--user" => parsed.user = Some(next_value(&mut args, "--user")?),
            "--token-count" => {
                let value = next_value(&mut args, "--token-count")?;
                let tokens = value
                    .parse::<i64>()
                    .map_err(|_| format!("invalid token count: {value}"))?;
                parsed.token_count = Some(tokens);
            }
            "--cost" => {
                let value = next_value(&mut args, "--cost")?;
                let cost = value
                    .parse::<f64>()
                    .map_err(|_| format!("invalid cost value: {value}"))?;
                parsed.cost = Some(cost);
            }
            "--date" => parsed.date = Some(next_value(&mut args, "--date")?),
            "--device" => parsed.device = Some(next_value(&mut args, "--device")?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn print_help() {
    println!(
        "CCgather CLI\n\n\
Usage:\n  ccgather serve [--port <port>] [--no-open]\n  ccgather submit --server <url> --user <id> [options]\n\n\
Serve options:\n  --port <port>      Override the configured port for this run only\n  --no-open          Do not open the browser automatically\n\n\
Submit options:\n  --server <url>     Base URL of a running CCgather server\n  --user <id>        User id to submit usage for\n  --token-count <n>  Tokens used on the day (default 0)\n  --cost <x>         Cost in USD for the day (default 0)\n  --date <date>      Day to report, YYYY-MM-DD (default today)\n  --device <name>    Device name, hashed into the device id (default $HOSTNAME)\n\n\
  -h, --help         Show this help message\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_submit_flags() {
        let parsed = parse_submit(strings(&[
            "--server",
            "http://127.0.0.1:3888",
            "--user",
            "auth-1",
            "--token-count",
            "1200",
            "--cost",
            "0.5",
        ]))
        .expect("parse");
        assert_eq!(parsed.server.as_deref(), Some("http://127.0.0.1:3888"));
        assert_eq!(parsed.user.as_deref(), Some("auth-1"));
        assert_eq!(parsed.token_count, Some(1200));
        assert_eq!(parsed.cost, Some(0.5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_serve(strings(&["--port", "not-a-port"])).is_err());
        assert!(parse_submit(strings(&["--token-count"])).is_err());
        assert!(parse_submit(strings(&["--frobnicate"])).is_err());
    }
}
