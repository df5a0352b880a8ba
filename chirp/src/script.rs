// Register scripts: one command per line, `#` starts a comment.
//
//     write 0xFF12 0xF0   # register write
//     render 4096         # render that many stereo samples
//     mute 2 / unmute 2   # host mute of a channel
//     output off / on     # output gate

use chirp_core::{REGISTERS_END, REGISTERS_START};
use core::fmt;

// About six minutes at 48 kHz per command.
pub const MAX_RENDER_SAMPLES: usize = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Mute { channel: usize, muted: bool },
    Output { enabled: bool },
    Render { samples: usize },
    Write { address: u16, val: u8 },
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseError {
    line: usize,
    message: String,
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

fn number<T: TryFrom<u64>>(token: Option<&str>, what: &str) -> Result<T, String> {
    let token = token.ok_or_else(|| format!("missing {what}"))?;

    let parsed = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).map_or_else(
        || token.parse::<u64>().ok(),
        |hex| u64::from_str_radix(hex, 16).ok(),
    );

    parsed
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| format!("invalid {what}: {token}"))
}

fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let code = line.split('#').next().unwrap_or_default();
    let mut tokens = code.split_whitespace();

    let Some(keyword) = tokens.next() else {
        return Ok(None);
    };

    let command = match keyword {
        "write" => {
            let address = number(tokens.next(), "address")?;
            if !(REGISTERS_START..=REGISTERS_END).contains(&address) {
                return Err(format!(
                    "address {address:#06X} is outside the sound registers \
                     {REGISTERS_START:#06X}..={REGISTERS_END:#06X}"
                ));
            }

            Command::Write {
                address,
                val: number(tokens.next(), "value")?,
            }
        }
        "render" => {
            let samples = number(tokens.next(), "sample count")?;
            if samples > MAX_RENDER_SAMPLES {
                return Err(format!(
                    "sample count {samples} is above the limit of {MAX_RENDER_SAMPLES}"
                ));
            }

            Command::Render { samples }
        }
        "mute" | "unmute" => Command::Mute {
            channel: number(tokens.next(), "channel")?,
            muted: keyword == "mute",
        },
        "output" => match tokens.next() {
            Some("on") => Command::Output { enabled: true },
            Some("off") => Command::Output { enabled: false },
            other => return Err(format!("expected on or off, got {other:?}")),
        },
        other => return Err(format!("unknown command: {other}")),
    };

    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected token: {extra}"));
    }

    Ok(Some(command))
}

pub fn parse(source: &str) -> Result<Vec<Command>, ParseError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            parse_line(line)
                .map_err(|message| ParseError {
                    line: index + 1,
                    message,
                })
                .transpose()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let script = "\
            # square wave\n\
            write 0xFF12 0xF0\n\
            write 65299 0x87 # decimal address\n\
            \n\
            render 4096\n\
            mute 3\n\
            unmute 3\n\
            output off\n";

        assert_eq!(
            parse(script),
            Ok(vec![
                Command::Write {
                    address: 0xFF12,
                    val: 0xF0
                },
                Command::Write {
                    address: 0xFF13,
                    val: 0x87
                },
                Command::Render { samples: 4096 },
                Command::Mute {
                    channel: 3,
                    muted: true
                },
                Command::Mute {
                    channel: 3,
                    muted: false
                },
                Command::Output { enabled: false },
            ])
        );
    }

    #[test]
    fn test_errors_report_line() {
        let err = parse("render 10\nwrite 0xFF12 0x100\n");

        assert_eq!(
            err.map_err(|e| e.to_string()),
            Err("line 2: invalid value: 0x100".to_owned())
        );
    }

    #[test]
    fn test_rejects_unknown_and_trailing_tokens() {
        assert!(parse("play 1").is_err());
        assert!(parse("render 1 2").is_err());
        assert!(parse("write 0xFF12").is_err());
        assert!(parse("output maybe").is_err());
    }

    #[test]
    fn test_rejects_addresses_outside_sound_registers() {
        assert_eq!(
            parse("write 0xFF10 0x80\nwrite 0xFF00 0x01\n").map_err(|e| e.line),
            Err(2)
        );
        assert!(parse("write 0xFF0F 0x00").is_err());
        assert!(parse("write 0xFF40 0x00").is_err());
        assert!(parse("write 0xFF3F 0x00").is_ok());
    }

    #[test]
    fn test_rejects_oversized_render() {
        assert!(parse(&format!("render {MAX_RENDER_SAMPLES}")).is_ok());
        assert!(parse(&format!("render {}", MAX_RENDER_SAMPLES + 1)).is_err());
        assert!(parse("render 18446744073709551615").is_err());
    }
}
