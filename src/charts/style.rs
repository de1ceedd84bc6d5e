use plotters::style::RGBColor;

/// Matplotlib's default cycle, so charts keep the colours readers know.
const TAB10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Immutable look of both charts. Built once and passed to each renderer.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Image size in pixels.
    pub size: (u32, u32),
    pub font_family: &'static str,
    pub font_size: u32,
    pub title_size: u32,
    pub palette: &'static [RGBColor],
    /// Text and box fill of the `<tag>: <count>` labels.
    pub tag_text: RGBColor,
    pub tag_box: RGBColor,
    pub annotation: RGBColor,
    /// How far right of a series' last point its label sits.
    pub tag_label_offset_days: f64,
    /// Extra x range kept free on the right for the tag labels.
    pub label_room_days: f64,
    /// How far right of the run time the daily rate label sits.
    pub rate_label_offset_days: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            size: (900, 500),
            font_family: "sans-serif",
            font_size: 12,
            title_size: 16,
            palette: &TAB10,
            tag_text: RGBColor(0x79, 0x7c, 0xa0),
            tag_box: RGBColor(0xe1, 0xec, 0xf4),
            annotation: RGBColor(0x80, 0x80, 0x80),
            tag_label_offset_days: 150.0,
            label_room_days: 1100.0,
            rate_label_offset_days: 30.0,
        }
    }
}

impl ChartStyle {
    /// Series colour for the `i`-th line, cycling through the palette.
    pub fn color(&self, i: usize) -> RGBColor {
        self.palette[i % self.palette.len()]
    }
}
