use crate::{
    cli::{
        actions::{account, character, Action},
        commands::{
            self,
            account::{ARG_EMAIL, ARG_PASSWORD},
            hashing,
        },
        globals::GlobalArgs,
    },
    identity::{Character, DEFAULT_RESET_TTL_SECONDS},
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --{id}"))
}

fn email(matches: &ArgMatches) -> Result<String> {
    string(matches, ARG_EMAIL)
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    string(matches, id).map(SecretString::from)
}

fn optional_secret(matches: &ArgMatches, id: &str) -> Option<SecretString> {
    matches.get_one::<String>(id).cloned().map(SecretString::from)
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let dsn = string(matches, commands::ARG_DSN)?;
    let hashing = hashing::parse(matches)?;
    let reset_ttl_seconds = matches
        .get_one::<i64>(commands::ARG_RESET_TTL_SECONDS)
        .copied()
        .unwrap_or(DEFAULT_RESET_TTL_SECONDS);

    Ok(GlobalArgs::new(dsn)
        .with_hashing(hashing)
        .with_reset_ttl_seconds(reset_ttl_seconds))
}

fn character_action(matches: &ArgMatches) -> Result<character::Request> {
    let (name, sub) = matches
        .subcommand()
        .context("missing character subcommand")?;

    let email = email(sub)?;
    let character_name = string(sub, "name")?;

    match name {
        "add" => {
            let level = sub.get_one::<u32>("level").copied().unwrap_or(1);
            Ok(character::Request::Add {
                email,
                character: Character::new(
                    &string(sub, "realm")?,
                    &character_name,
                    &string(sub, "faction")?,
                    &string(sub, "class")?,
                    &string(sub, "role")?,
                    level,
                ),
            })
        }
        "remove" => Ok(character::Request::Remove {
            email,
            name: character_name,
        }),
        "primary" => Ok(character::Request::Primary {
            email,
            name: character_name,
        }),
        other => Err(anyhow!("unknown character subcommand: {other}")),
    }
}

fn account_action(name: &str, sub: &ArgMatches) -> Result<account::Request> {
    let email = email(sub)?;

    let request = match name {
        "signup" => account::Request::Signup {
            email,
            password: optional_secret(sub, ARG_PASSWORD),
        },
        "login" => account::Request::Login {
            email,
            password: secret(sub, ARG_PASSWORD)?,
        },
        "password" => account::Request::Password {
            email,
            password: secret(sub, ARG_PASSWORD)?,
        },
        "set-email" => account::Request::SetEmail {
            email,
            new_email: string(sub, "new-email")?,
        },
        "delete" => account::Request::Delete { email },
        "show" => account::Request::Show { email },
        "link" => account::Request::Link {
            email,
            provider: string(sub, "provider")?,
            account_id: string(sub, "account-id")?,
            access_token: optional_secret(sub, "access-token"),
        },
        "unlink" => account::Request::Unlink {
            email,
            provider: string(sub, "provider")?,
        },
        "reset-request" => account::Request::ResetRequest { email },
        "reset" => account::Request::Reset {
            email,
            token: secret(sub, "token")?,
            password: secret(sub, ARG_PASSWORD)?,
        },
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(request)
}

/// Map parsed arguments to the global settings and the action to run.
///
/// # Errors
/// Returns an error if the DSN or a subcommand argument is missing.
pub fn handler(matches: &ArgMatches) -> Result<(GlobalArgs, Action)> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some(("migrate", _)) => Action::Migrate,
        Some(("character", sub)) => Action::Character(character_action(sub)?),
        Some((name, sub)) => Action::Account(account_action(name, sub)?),
        None => return Err(anyhow!("no command given")),
    };

    Ok((globals, action))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::HashingConfig;
    use secrecy::ExposeSecret;

    const DSN: &str = "postgres://lfg@localhost:5432/lfg";

    fn dispatch(args: &[&str]) -> Result<(GlobalArgs, Action)> {
        let matches = commands::new().try_get_matches_from(args.iter().copied())?;
        handler(&matches)
    }

    #[test]
    fn missing_dsn_is_an_error() {
        temp_env::with_vars([("LFG_DSN", None::<&str>)], || {
            let err = dispatch(&["lfg", "show", "-e", "a@b.com"]).unwrap_err();
            assert_eq!(err.to_string(), "missing required argument: --dsn");
        });
    }

    #[test]
    fn globals_from_env() {
        temp_env::with_vars(
            [
                ("LFG_DSN", Some(DSN)),
                ("LFG_ARGON2_MEMORY_KIB", Some("19456")),
                ("LFG_ARGON2_ITERATIONS", Some("2")),
                ("LFG_ARGON2_PARALLELISM", None),
                ("LFG_RESET_TTL_SECONDS", Some("900")),
            ],
            || {
                let (globals, action) = dispatch(&["lfg", "migrate"]).unwrap();
                assert_eq!(globals.dsn, DSN);
                assert_eq!(globals.hashing, HashingConfig::new(19456, 2, 1));
                assert_eq!(globals.reset_ttl_seconds, 900);
                assert!(matches!(action, Action::Migrate));
            },
        );
    }

    #[test]
    fn signup_password_is_optional() {
        temp_env::with_vars(
            [("LFG_DSN", Some(DSN)), ("LFG_PASSWORD", None::<&str>)],
            || {
                let (_, action) = dispatch(&["lfg", "signup", "-e", "a@b.com"]).unwrap();
                assert!(matches!(
                    action,
                    Action::Account(account::Request::Signup { password: None, .. })
                ));
            },
        );
    }

    #[test]
    fn reset_reads_token_and_password_from_env() {
        temp_env::with_vars(
            [
                ("LFG_DSN", Some(DSN)),
                ("LFG_RESET_TOKEN", Some("tok")),
                ("LFG_PASSWORD", Some("new-pass")),
            ],
            || {
                let (_, action) = dispatch(&["lfg", "reset", "-e", "a@b.com"]).unwrap();
                let Action::Account(account::Request::Reset {
                    email,
                    token,
                    password,
                }) = action
                else {
                    panic!("expected reset request");
                };
                assert_eq!(email, "a@b.com");
                assert_eq!(token.expose_secret(), "tok");
                assert_eq!(password.expose_secret(), "new-pass");
            },
        );
    }

    #[test]
    fn character_add() {
        temp_env::with_vars([("LFG_DSN", Some(DSN))], || {
            let (_, action) = dispatch(&[
                "lfg", "character", "add", "-e", "a@b.com", "-n", "Thrall", "--realm",
                "Firemaw", "--class", "shaman", "--faction", "horde", "--role", "healer",
            ])
            .unwrap();
            let Action::Character(character::Request::Add { email, character }) = action else {
                panic!("expected character add");
            };
            assert_eq!(email, "a@b.com");
            assert_eq!(
                character,
                Character::new("Firemaw", "Thrall", "horde", "shaman", "healer", 1)
            );
        });
    }

    #[test]
    fn character_primary() {
        temp_env::with_vars([("LFG_DSN", Some(DSN))], || {
            let (_, action) =
                dispatch(&["lfg", "character", "primary", "-e", "a@b.com", "-n", "Thrall"])
                    .unwrap();
            assert!(matches!(
                action,
                Action::Character(character::Request::Primary { ref name, .. }) if name == "Thrall"
            ));
        });
    }
}
