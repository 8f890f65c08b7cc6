use crate::data::schema::FieldId;
use crate::error::{Error, Result};

/// Floor `value` to the start of its bucket of the given width.
pub fn bucket(value: f64, width: f64) -> f64 {
    let mut origin = (value / width).floor() * width;
    // correct for rounding in the division near bucket edges
    if origin > value {
        origin -= width;
    } else if value >= origin + width {
        origin += width;
    }
    canonical(origin)
}

/// Display label for a bucket: inclusive low and inclusive high, e.g. `"2-3"` for width 2.
pub fn bucket_label(origin: f64, width: f64) -> String {
    format!("{}-{}", canonical(origin), canonical(origin + width - 1.0))
}

/// Check that a bin width is usable for `field`.
pub fn validate_width(field: FieldId, width: f64) -> Result<f64> {
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(Error::InvalidBinWidth { field: field.column_name().to_string(), width })
    }
}

/// Map `-0.0` to `0.0` so equal buckets hash and print identically.
pub(crate) fn canonical(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Bins over the observed extent of a column, cut at "nice" thresholds
/// (steps of 1, 2 or 5 times a power of ten) for roughly `count` bins.
/// The first and last bins are clipped to the extent. Bins are half-open
/// except the last, which also holds the maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentBins {
    /// `low`, the inner thresholds, then `high`.
    edges: Vec<f64>,
}

impl ExtentBins {
    /// Returns `None` when there are no finite values or `count` is zero.
    pub fn from_values<I>(values: I, count: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            low = low.min(v);
            high = high.max(v);
        }
        if !low.is_finite() || count == 0 {
            return None;
        }
        let mut edges = vec![low];
        edges.extend(nice_ticks(low, high, count as f64).into_iter().filter(|t| *t > low && *t < high));
        edges.push(high);
        Some(Self { edges })
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn index_of(&self, value: f64) -> usize {
        let inner = &self.edges[1..self.edges.len() - 1];
        inner.partition_point(|t| *t <= value)
    }

    /// Bounds `(low, high)` of bin `idx`.
    pub fn bounds(&self, idx: usize) -> (f64, f64) {
        let idx = idx.min(self.bin_count() - 1);
        (canonical(self.edges[idx]), canonical(self.edges[idx + 1]))
    }
}

/// Round tick values covering `[start, stop]`, about `count` of them.
fn nice_ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || start >= stop {
        return Vec::new();
    }
    let Some((i1, i2, inc)) = tick_spec(start, stop, count) else {
        return Vec::new();
    };
    (i1..=i2)
        .map(|i| {
            let i = i as f64;
            if inc < 0.0 { i / -inc } else { i * inc }
        })
        .collect()
}

/// Integer tick range and increment. A negative increment means "divide by".
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let scale = 10f64.powf(-power) / factor;
        i1 = (start * scale).round();
        i2 = (stop * scale).round();
        if i1 / scale < start { i1 += 1.0; }
        if i2 / scale > stop { i2 -= 1.0; }
        inc = -scale;
    } else {
        let scale = 10f64.powf(power) * factor;
        i1 = (start / scale).round();
        i2 = (stop / scale).round();
        if i1 * scale < start { i1 += 1.0; }
        if i2 * scale > stop { i2 -= 1.0; }
        inc = scale;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    if !(i1.is_finite() && i2.is_finite()) || i2 < i1 {
        return None;
    }
    Some((i1 as i64, i2 as i64, inc))
}

/// Display label for an extent bin.
pub fn range_label(low: f64, high: f64) -> String {
    format!("[{low:.2}, {high:.2})")
}
