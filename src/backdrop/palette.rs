//! Median-cut color quantization over raw RGBA data.

/// One extracted color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Perceived brightness (ITU-R BT.709 luma coefficients).
    pub fn luminance(&self) -> f64 {
        0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b)
    }
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn of(self, color: &Rgb) -> u8 {
        match self {
            Channel::Red => color.r,
            Channel::Green => color.g,
            Channel::Blue => color.b,
        }
    }
}

/// Reduces raw RGBA data to `2^depth` colors, ordered darkest first.
///
/// The alpha byte is ignored and a trailing partial pixel is dropped. Empty
/// input yields an empty palette; otherwise the palette always has exactly
/// `2^depth` entries, with starved buckets reported as black.
pub fn quantize(rgba: &[u8], depth: u32) -> Vec<Rgb> {
    let pixels: Vec<Rgb> = rgba
        .chunks_exact(4)
        .map(|px| Rgb {
            r: px[0],
            g: px[1],
            b: px[2],
        })
        .collect();
    if pixels.is_empty() {
        return Vec::new();
    }

    let mut palette = Vec::with_capacity(1 << depth);
    median_cut(pixels, depth, &mut palette);
    palette.sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
    palette
}

fn median_cut(mut bucket: Vec<Rgb>, depth: u32, palette: &mut Vec<Rgb>) {
    if depth == 0 {
        palette.push(average(&bucket));
        return;
    }
    let channel = widest_channel(&bucket);
    bucket.sort_by_key(|color| channel.of(color));
    let upper = bucket.split_off(bucket.len() / 2);
    median_cut(bucket, depth - 1, palette);
    median_cut(upper, depth - 1, palette);
}

fn average(bucket: &[Rgb]) -> Rgb {
    if bucket.is_empty() {
        return Rgb::BLACK;
    }
    let count = bucket.len() as u64;
    let mut sums = [0u64; 3];
    for color in bucket {
        sums[0] += u64::from(color.r);
        sums[1] += u64::from(color.g);
        sums[2] += u64::from(color.b);
    }
    Rgb {
        r: (sums[0] / count) as u8,
        g: (sums[1] / count) as u8,
        b: (sums[2] / count) as u8,
    }
}

/// The channel with the widest value range. Red wins ties against green and
/// both against blue.
fn widest_channel(bucket: &[Rgb]) -> Channel {
    let mut min = Rgb {
        r: u8::MAX,
        g: u8::MAX,
        b: u8::MAX,
    };
    let mut max = Rgb::BLACK;
    for color in bucket {
        min.r = min.r.min(color.r);
        min.g = min.g.min(color.g);
        min.b = min.b.min(color.b);
        max.r = max.r.max(color.r);
        max.g = max.g.max(color.g);
        max.b = max.b.max(color.b);
    }
    let r = max.r.saturating_sub(min.r);
    let g = max.g.saturating_sub(min.g);
    let b = max.b.saturating_sub(min.b);
    if r >= g {
        if r >= b {
            Channel::Red
        } else {
            Channel::Blue
        }
    } else if g >= b {
        Channel::Green
    } else {
        Channel::Blue
    }
}
