use clap::{Arg, Command};

use super::account::email_arg;

fn name_arg() -> Arg {
    Arg::new("name")
        .short('n')
        .long("name")
        .help("Character name")
        .required(true)
}

#[must_use]
pub fn subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new("character")
            .about("Manage the character roster")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(
                Command::new("add")
                    .about("Add a character to the roster")
                    .arg(email_arg())
                    .arg(name_arg())
                    .arg(
                        Arg::new("realm")
                            .long("realm")
                            .help("Realm name")
                            .required(true),
                    )
                    .arg(
                        Arg::new("class")
                            .long("class")
                            .help("Class: warrior, paladin, mage, druid, shaman, warlock, rogue, priest")
                            .required(true),
                    )
                    .arg(
                        Arg::new("faction")
                            .long("faction")
                            .help("Faction")
                            .required(true),
                    )
                    .arg(
                        Arg::new("role")
                            .long("role")
                            .help("Role, e.g. tank, healer, dps")
                            .required(true),
                    )
                    .arg(
                        Arg::new("level")
                            .long("level")
                            .help("Character level")
                            .default_value("1")
                            .value_parser(clap::value_parser!(u32).range(1..)),
                    ),
            )
            .subcommand(
                Command::new("remove")
                    .about("Remove a character from the roster")
                    .arg(email_arg())
                    .arg(name_arg()),
            )
            .subcommand(
                Command::new("primary")
                    .about("Choose the primary character shown on the profile")
                    .arg(email_arg())
                    .arg(name_arg()),
            ),
    )
}
