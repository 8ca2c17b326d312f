use clap::{Arg, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account email address")
        .required(true)
}

/// Passwords come from `LFG_PASSWORD` unless given on the command line.
#[must_use]
pub fn password_arg(required: bool) -> Arg {
    Arg::new(ARG_PASSWORD)
        .long("password")
        .help("Account password")
        .env("LFG_PASSWORD")
        .hide_env_values(true)
        .required(required)
}

#[must_use]
pub fn subcommands(command: Command) -> Command {
    command
        .subcommand(Command::new("migrate").about("Create the users table if missing"))
        .subcommand(
            Command::new("signup")
                .about("Register a new account")
                .arg(email_arg())
                .arg(password_arg(false)),
        )
        .subcommand(
            Command::new("login")
                .about("Check a password against the stored credential")
                .arg(email_arg())
                .arg(password_arg(true)),
        )
        .subcommand(
            Command::new("password")
                .about("Set a new password")
                .arg(email_arg())
                .arg(password_arg(true)),
        )
        .subcommand(
            Command::new("set-email")
                .about("Change the account email address")
                .arg(email_arg())
                .arg(
                    Arg::new("new-email")
                        .long("new-email")
                        .help("New email address")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete the account permanently")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print the account profile as JSON")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("link")
                .about("Link an external login provider")
                .arg(email_arg())
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .help("Provider name, e.g. facebook")
                        .required(true),
                )
                .arg(
                    Arg::new("account-id")
                        .long("account-id")
                        .help("Account id at the provider")
                        .required(true),
                )
                .arg(
                    Arg::new("access-token")
                        .long("access-token")
                        .help("Access token issued by the provider")
                        .env("LFG_PROVIDER_ACCESS_TOKEN")
                        .hide_env_values(true),
                ),
        )
        .subcommand(
            Command::new("unlink")
                .about("Unlink an external login provider and drop its tokens")
                .arg(email_arg())
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .help("Provider name")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("reset-request")
                .about("Issue a password reset token")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("reset")
                .about("Consume a password reset token and set a new password")
                .arg(email_arg())
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Reset token")
                        .env("LFG_RESET_TOKEN")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(password_arg(true)),
        )
}
