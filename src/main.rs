use std::env;
use std::fs;
use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dialogue_player::config::{render_template, AudioSettings};
use dialogue_player::playback::{format_time, Timeline};
use dialogue_player::{embedded_dialogue, embedded_dialogue_ids, parse_script_with_format, Dialogue, PlayerConfig};

const USAGE: &str = "\
Usage: dialogue-player <script.txt> [--id <dialogue-id>] [--config <config.yaml>] [--lang <code>]
       dialogue-player --embedded <dialogue-id> [--config <config.yaml>] [--lang <code>]
       dialogue-player --list";

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    if args[0] == "--list" {
        for id in embedded_dialogue_ids() {
            println!("{}", id);
        }
        return;
    }

    let mut script_path: Option<&String> = None;
    let mut embedded: Option<&String> = None;
    let mut dialogue_id: Option<&String> = None;
    let mut config_path: Option<&String> = None;
    let mut language: Option<&String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let slot = match arg.as_str() {
            "--embedded" => &mut embedded,
            "--id" => &mut dialogue_id,
            "--config" => &mut config_path,
            "--lang" => &mut language,
            flag if flag.starts_with("--") => {
                eprintln!("Unknown option '{}'\n{}", flag, USAGE);
                process::exit(1);
            }
            _ => {
                script_path = Some(arg);
                continue;
            }
        };
        match iter.next() {
            Some(value) => *slot = Some(value),
            None => {
                eprintln!("Missing value for '{}'\n{}", arg, USAGE);
                process::exit(1);
            }
        }
    }

    let config = match config_path {
        Some(path) => {
            let source = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading config '{}': {}", path, e);
                    process::exit(1);
                }
            };
            match PlayerConfig::from_yaml(&source) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        None => PlayerConfig::default(),
    };

    let (id, result) = match (embedded, script_path) {
        (Some(id), _) => (id.clone(), embedded_dialogue(id, &config.script)),
        (None, Some(path)) => {
            let source = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading file '{}': {}", path, e);
                    process::exit(1);
                }
            };
            let id = dialogue_id.cloned().unwrap_or_else(|| file_stem(path));
            (id, parse_script_with_format(&source, &config.script))
        }
        (None, None) => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let dialogue = match result {
        Ok(dialogue) => dialogue,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let translation_language = language.map(String::as_str).unwrap_or(config.audio.language.as_str());
    print_dialogue(&id, &dialogue, &config.audio, translation_language);
}

fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Transcript with clip locators and the estimated timeline
fn print_dialogue(id: &str, dialogue: &Dialogue, audio: &AudioSettings, language: &str) {
    let timeline = Timeline::new(
        dialogue
            .lines
            .iter()
            .map(|line| audio.fallback_duration.estimate(&line.text)),
    );

    if let Some(title) = &dialogue.title {
        println!("{}", title);
    }
    println!(
        "{} lines, estimated {} (dialogue '{}')",
        dialogue.len(),
        format_time(timeline.total()),
        id
    );
    println!();

    for (index, line) in dialogue.lines.iter().enumerate() {
        println!(
            "[{}] {:>5}  {}: {}",
            index,
            format_time(timeline.cumulative_before(index)),
            line.speaker,
            line.text
        );
        if let Some(translation) = line.translation(language) {
            println!("          {}: {}", language.to_uppercase(), translation);
        }
        println!(
            "          audio: {}",
            render_template(&audio.primary_path, &audio.language, id, index)
        );
        if let Some(fallback) = &audio.fallback_path {
            println!("          fallback: {}", render_template(fallback, &audio.language, id, index));
        }
    }
}
