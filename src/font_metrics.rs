//! Font metrics for the builtin Helvetica faces used on order sheets.
//!
//! Widths come from the Adobe Font Metrics files and are expressed in
//! 1/1000 of the em square, indexed by printable ASCII code point.

const FIRST_PRINTABLE: u32 = 0x20;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width table plus vertical metrics for one face.
#[derive(Debug)]
pub struct FontMetrics {
    widths: &'static [u16; 95],
    /// Used for characters outside the table
    default_width: u16,
    pub units_per_em: u16,
    pub ascender: i16,
}

static HELVETICA: FontMetrics = FontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
    units_per_em: 1000,
    ascender: 718,
};

static HELVETICA_BOLD: FontMetrics = FontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    default_width: 556,
    units_per_em: 1000,
    ascender: 718,
};

impl FontMetrics {
    /// Width of a character in em units (1/1000)
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as u32;
        if (FIRST_PRINTABLE..FIRST_PRINTABLE + 95).contains(&code) {
            return self.widths[(code - FIRST_PRINTABLE) as usize];
        }
        match c {
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' | '\u{2122}' => 1000,
            '\u{2018}' | '\u{2019}' => 222,
            '\u{201C}' | '\u{201D}' => 333,
            '\u{00B0}' => 400,
            '\u{00D7}' | '\u{00F7}' | '\u{00B1}' => 584,
            _ => self.default_width,
        }
    }

    /// Width of a string in points
    pub fn string_width(&self, text: &str, font_size: f32) -> f32 {
        let total_units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        (total_units as f32 / self.units_per_em as f32) * font_size
    }

    /// Distance from the top of a line box to the baseline, in points
    pub fn ascent(&self, font_size: f32) -> f32 {
        self.ascender as f32 / self.units_per_em as f32 * font_size
    }
}

pub fn helvetica() -> &'static FontMetrics {
    &HELVETICA
}

pub fn helvetica_bold() -> &'static FontMetrics {
    &HELVETICA_BOLD
}

pub fn get_metrics(bold: bool) -> &'static FontMetrics {
    if bold {
        helvetica_bold()
    } else {
        helvetica()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width() {
        // H=722, e=556, l=222, l=222, o=556 = 2278 units
        let width = helvetica().string_width("Hello", 12.0);
        assert!((width - 27.336).abs() < 0.01);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = helvetica().string_width("Order 1042", 12.0);
        let bold = helvetica_bold().string_width("Order 1042", 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_unknown_char_uses_default() {
        assert_eq!(helvetica().char_width('\u{4E2D}'), 556);
        assert_eq!(helvetica().char_width('\u{2014}'), 1000);
    }
}
