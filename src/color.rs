use palette::{Hsl, IntoColor, Srgb};

/// Number of distinct colours before segment slots wrap around.
pub const SEGMENT_PALETTE_SIZE: usize = 6;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SegmentPalette: company segment → colour
// ---------------------------------------------------------------------------

/// Assigns each company segment a stable colour slot in first-seen order.
///
/// Owned by one session; nothing is shared between palettes.
#[derive(Debug, Clone)]
pub struct SegmentPalette {
    seen: Vec<String>,
    colors: Vec<Srgb<u8>>,
}

impl Default for SegmentPalette {
    fn default() -> Self {
        Self::new(SEGMENT_PALETTE_SIZE)
    }
}

impl SegmentPalette {
    /// A palette cycling through `size` colours (at least one).
    pub fn new(size: usize) -> Self {
        SegmentPalette {
            seen: Vec::new(),
            colors: generate_palette(size.max(1)),
        }
    }

    /// Slot index of `segment`, registering it on first sight.
    pub fn slot_for(&mut self, segment: &str) -> usize {
        match self.seen.iter().position(|s| s == segment) {
            Some(i) => i,
            None => {
                self.seen.push(segment.to_string());
                self.seen.len() - 1
            }
        }
    }

    /// Look up (or assign) the colour for `segment`.
    pub fn color_for(&mut self, segment: &str) -> Srgb<u8> {
        let slot = self.slot_for(segment);
        self.colors[slot % self.colors.len()]
    }

    /// `#rrggbb` form of [`color_for`](Self::color_for).
    pub fn hex_for(&mut self, segment: &str) -> String {
        let c = self.color_for(segment);
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    }

    /// Segments seen so far with their colours, in first-seen order.
    pub fn legend_entries(&self) -> Vec<(String, Srgb<u8>)> {
        self.seen
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), self.colors[i % self.colors.len()]))
            .collect()
    }
}
