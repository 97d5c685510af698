use std::io::IsTerminal;
use std::num::NonZeroUsize;

use crossterm::style::{Color, Stylize};
use url::Url;

const BANNER_LINES: [&str; 7] = [
    "██████╗  █████╗ ██████╗ ██████╗  █████╗  ██████╗ ███████╗",
    "██╔══██╗██╔══██╗██╔══██╗██╔══██╗██╔══██╗██╔════╝ ██╔════╝",
    "██████╔╝███████║██████╔╝██████╔╝███████║██║  ███╗█████╗  ",
    "██╔══██╗██╔══██║██╔══██╗██╔══██╗██╔══██║██║   ██║██╔══╝  ",
    "██████╔╝██║  ██║██║  ██║██║  ██║██║  ██║╚██████╔╝███████╗",
    "╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝ ╚══════╝",
    "                                                         ",
];

type Rgb = (u8, u8, u8);

const COLOR_START: Rgb = (0xff, 0x8a, 0x3d);
const COLOR_MID: Rgb = (0xff, 0x3d, 0x5a);
const COLOR_END: Rgb = (0x9b, 0x3d, 0xff);
const SUBTITLE_RGB: Rgb = (0xff, 0x3d, 0x5a);

pub(crate) fn print_cli_banner(no_color: bool, target: &Url, workers: NonZeroUsize) {
    let use_color = !no_color && std::io::stdout().is_terminal();
    let last = BANNER_LINES.len().saturating_sub(1);
    for (idx, line) in BANNER_LINES.iter().enumerate() {
        if use_color {
            let (r, g, b) = banner_rgb(idx, last);
            println!("{}", line.with(Color::Rgb { r, g, b }));
        } else {
            println!("{line}");
        }
    }

    let description = format!(
        "barrage v{} | {} | {} workers -> {}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_LICENSE"),
        workers,
        target
    );
    if use_color {
        let (r, g, b) = SUBTITLE_RGB;
        println!("{}", description.with(Color::Rgb { r, g, b }));
    } else {
        println!("{description}");
    }
}

/// Color for banner row `idx` of `0..=last`: start to mid over the top half,
/// mid to end over the rest.
fn banner_rgb(idx: usize, last: usize) -> Rgb {
    let last = last.max(1);
    let half = last / 2;
    if idx <= half {
        blend(COLOR_START, COLOR_MID, idx, half)
    } else {
        blend(COLOR_MID, COLOR_END, idx.saturating_sub(half), last.saturating_sub(half))
    }
}

fn blend(from: Rgb, to: Rgb, step: usize, steps: usize) -> Rgb {
    let steps = u32::try_from(steps.max(1)).unwrap_or(u32::MAX);
    let step = u32::try_from(step).unwrap_or(u32::MAX).min(steps);
    let channel = |a: u8, b: u8| -> u8 {
        let (a, b) = (u32::from(a), u32::from(b));
        let mixed = a
            .saturating_mul(steps.saturating_sub(step))
            .saturating_add(b.saturating_mul(step))
            .checked_div(steps)
            .unwrap_or(a);
        u8::try_from(mixed).unwrap_or(u8::MAX)
    };
    (
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}
