use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use pic_convert::{AppConfig, ColorSample, Presenter, Preview, Session};

/// Message boxes and yes/no dialogs on stdout/stdin
struct Terminal;

impl Presenter for Terminal {
    fn notify(&mut self, success: bool, message: &str) {
        if success {
            println!("✓ {}", message);
        } else {
            eprintln!("✗ {}", message);
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if let Err(e) = io::stdout().flush() {
            log::warn!("failed to flush prompt: {}", e);
        }
        matches!(
            read_line().as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        )
    }
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn main() -> Result<ExitCode> {
    pic_convert::init_logger();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: pic-convert <image>");
    };

    let mut session = Session::new(path, AppConfig::default(), Terminal);
    let labels: Vec<String> = session
        .format_buttons()
        .into_iter()
        .map(|(_, label)| label)
        .collect();

    println!("📁 {}", session.file_name());
    println!("Convert to: {}", labels.join("  "));
    println!("Remove a color: `pick <x> <y>` samples a pixel, `color <#RRGGBB | r,g,b>` names one");
    println!("Empty line or `quit` exits");

    let mut preview: Option<Preview> = None;

    loop {
        print!("> ");
        io::stdout().flush().context("writing prompt")?;
        let Some(line) = read_line() else {
            return Ok(ExitCode::SUCCESS);
        };

        let mut words = line.split_whitespace();
        let color = match words.next() {
            None | Some("quit") | Some("q") => return Ok(ExitCode::SUCCESS),
            Some("pick") => {
                let coords: Vec<u32> = words.filter_map(|w| w.parse().ok()).collect();
                let [x, y] = coords[..] else {
                    eprintln!("expected `pick <x> <y>`");
                    continue;
                };
                if preview.is_none() {
                    match session.open_preview() {
                        Ok(opened) => preview = Some(opened),
                        Err(e) => {
                            eprintln!("✗ {}", e);
                            return Ok(ExitCode::FAILURE);
                        }
                    }
                }
                match preview.as_ref().and_then(|p| p.sample(x, y)) {
                    Some(color) => color,
                    None => {
                        eprintln!("({}, {}) is outside the image", x, y);
                        continue;
                    }
                }
            }
            Some("color") => match words.collect::<Vec<_>>().join(" ").parse::<ColorSample>() {
                Ok(color) => color,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            },
            Some(format) => {
                return Ok(match session.select_format(format) {
                    Ok(_) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                });
            }
        };

        println!("{}", color.readout());
        match session.pick_color(color) {
            Ok(Some(_)) => return Ok(ExitCode::SUCCESS),
            Ok(None) => continue,
            Err(_) => return Ok(ExitCode::FAILURE),
        }
    }
}
