use std::io::{self, IsTerminal};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::{CreateArgs, NoteArgs, ReadArgs};
use crate::client::Client;
use crate::constants::{MAX_PASSWORD_ATTEMPTS, PASSWORD_ENV};
use crate::errors::CliError;
use crate::helpers::{password_from_env, prompt_new_password, prompt_read_password, read_note_body};
use crate::output::{created_lines, metadata_lines, print_json, revealed_lines, Mode};
use crate::protocol::{Request, Response};

use super::unexpected;

pub fn handle_create(socket_path: &Path, args: CreateArgs, quiet: bool) -> anyhow::Result<()> {
    let content = read_note_body(args.body)?;
    let password = if args.prompt_password {
        Some(prompt_new_password()?)
    } else {
        args.password.map(Zeroizing::new)
    };

    let mut client = Client::connect(socket_path)?;
    let response = client.request(&Request::Create {
        ttl_hours: args.ttl_hours,
        content,
        password,
    })?;

    match response {
        Response::Created(created) => {
            if args.json {
                print_json(&created)?;
            } else if quiet {
                println!("{}", created.id);
            } else {
                for line in created_lines(Mode::detect(), &created) {
                    println!("{}", line);
                }
            }
            Ok(())
        }
        other => Err(unexpected(None, other)),
    }
}

pub fn handle_read(socket_path: &Path, args: ReadArgs, quiet: bool) -> anyhow::Result<()> {
    let interactive = !args.no_input && io::stdin().is_terminal();
    let mut password = args
        .password
        .map(Zeroizing::new)
        .or_else(|| password_from_env(PASSWORD_ENV));

    let mut client = Client::connect(socket_path)?;
    let mut attempts = 0;

    loop {
        let response = client.request(&Request::Read {
            id: args.id.clone(),
            password: password.clone(),
        })?;

        match response {
            Response::Revealed(body) => {
                if args.json {
                    print_json(&body)?;
                } else {
                    println!("{}", body.content.as_str());
                    if !quiet {
                        for line in revealed_lines(Mode::detect(), &body) {
                            eprintln!("{}", line);
                        }
                    }
                }
                return Ok(());
            }
            Response::PasswordRequired | Response::InvalidPassword
                if interactive && attempts < MAX_PASSWORD_ATTEMPTS =>
            {
                if response == Response::InvalidPassword {
                    eprintln!("Wrong password.");
                }
                attempts += 1;
                password = Some(prompt_read_password()?);
            }
            Response::InvalidPassword if interactive => {
                return Err(CliError::auth_failed(format!(
                    "Wrong password after {} attempts",
                    MAX_PASSWORD_ATTEMPTS
                ))
                .into());
            }
            other => {
                if args.json {
                    print_json(&other)?;
                }
                return Err(unexpected(Some(&args.id), other));
            }
        }
    }
}

pub fn handle_peek(socket_path: &Path, args: NoteArgs) -> anyhow::Result<()> {
    let mut client = Client::connect(socket_path)?;
    match client.request(&Request::Peek {
        id: args.id.clone(),
    })? {
        Response::Ready(metadata) => {
            if args.json {
                print_json(&metadata)?;
            } else {
                for line in metadata_lines(Mode::detect(), &metadata) {
                    println!("{}", line);
                }
            }
            Ok(())
        }
        other => {
            if args.json {
                print_json(&other)?;
            }
            Err(unexpected(Some(&args.id), other))
        }
    }
}

pub fn handle_delete(socket_path: &Path, args: NoteArgs, quiet: bool) -> anyhow::Result<()> {
    let mut client = Client::connect(socket_path)?;
    match client.request(&Request::Delete {
        id: args.id.clone(),
    })? {
        Response::Deleted => {
            if args.json {
                print_json(&Response::Deleted)?;
            } else if !quiet {
                println!("Deleted note {}", args.id);
            }
            Ok(())
        }
        other => {
            if args.json {
                print_json(&other)?;
            }
            Err(unexpected(Some(&args.id), other))
        }
    }
}
