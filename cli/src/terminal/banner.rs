use colored::*;

use crate::terminal::print;

const BANNER: &str = r#"
                    _
       _ __    ___ | |_  ___ __      __  ___   ___  _ __
      | '_ \  / _ \| __|/ __|\ \ /\ / / / _ \ / _ \| '_ \
      | | | ||  __/| |_ \__ \ \ V  V / |  __/|  __/| |_) |
      |_| |_| \___| \__||___/  \_/\_/   \___| \___|| .__/
                                                   |_|
"#;

const PALETTE: [(u8, u8, u8); 4] = [
    (120, 220, 140),
    (130, 200, 255),
    (255, 165, 0),
    (200, 120, 220),
];

pub fn print() {
    let (r, g, b) = PALETTE[rand::random_range(0..PALETTE.len())];
    print::print(&format!("{}", BANNER.truecolor(r, g, b).bold()));
}
