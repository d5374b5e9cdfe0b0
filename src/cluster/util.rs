#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Standardize each column to zero mean and unit (population) variance.
///
/// A constant column is centered but not scaled. Returns an empty vector for
/// empty input; rows are assumed to share one length.
pub fn standardize(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let d = first.len();
    let n = rows.len() as f64;

    let mut mean = vec![0.0; d];
    for row in rows {
        for (m, &x) in mean.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut scale = vec![0.0; d];
    for row in rows {
        for ((s, &x), &m) in scale.iter_mut().zip(row).zip(&mean) {
            *s += (x - m) * (x - m);
        }
    }
    for s in &mut scale {
        *s = (*s / n).sqrt();
        if *s == 0.0 {
            *s = 1.0;
        }
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&mean)
                .zip(&scale)
                .map(|((&x, &m), &s)| (x - m) / s)
                .collect()
        })
        .collect()
}
