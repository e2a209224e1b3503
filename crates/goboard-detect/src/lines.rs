//! Line candidates from projection profiles and evenly spaced line families.

/// Evenly spaced set of parallel lines along one axis.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineFamily {
    /// Line positions in pixels, ascending.
    pub positions: Vec<f32>,
    /// Median gap between consecutive lines.
    pub spacing: f32,
    /// Variance of the gaps; lower is more regular.
    pub variance: f32,
}

impl LineFamily {
    pub fn first(&self) -> f32 {
        self.positions.first().copied().unwrap_or(0.0)
    }

    pub fn last(&self) -> f32 {
        self.positions.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    fn from_positions(positions: Vec<f32>) -> Self {
        let mut gaps: Vec<f32> = positions.windows(2).map(|w| w[1] - w[0]).collect();
        let n = gaps.len().max(1) as f32;
        let mean = gaps.iter().sum::<f32>() / n;
        let variance = gaps.iter().map(|g| (g - mean) * (g - mean)).sum::<f32>() / n;
        gaps.sort_by(f32::total_cmp);
        let spacing = median_sorted(&gaps);
        Self {
            positions,
            spacing,
            variance,
        }
    }

    /// More lines wins; equal counts go to the lower gap variance.
    fn beats(&self, other: &LineFamily) -> bool {
        if self.len() != other.len() {
            return self.len() > other.len();
        }
        self.variance < other.variance
    }
}

fn median_sorted(v: &[f32]) -> f32 {
    match v.len() {
        0 => 0.0,
        n if n % 2 == 1 => v[n / 2],
        n => 0.5 * (v[n / 2 - 1] + v[n / 2]),
    }
}

/// Collapse a projection profile into line positions.
///
/// Bins at or above `min_support * max(profile)` are clustered when they lie
/// within `merge_px` of the previous strong bin (touching bins always merge);
/// each cluster yields its weighted centroid.
pub(crate) fn line_candidates(profile: &[f32], min_support: f32, merge_px: usize) -> Vec<f32> {
    let max = profile.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Vec::new();
    }
    let cutoff = max * min_support;

    struct Cluster {
        last: usize,
        weight: f64,
        moment: f64,
    }

    let mut out = Vec::new();
    let mut current: Option<Cluster> = None;
    for (i, &v) in profile.iter().enumerate() {
        if v <= 0.0 || v < cutoff {
            continue;
        }
        let w = v as f64;
        match current.as_mut() {
            Some(c) if i - c.last <= merge_px.max(1) => {
                c.last = i;
                c.weight += w;
                c.moment += w * i as f64;
            }
            _ => {
                if let Some(c) = current.take() {
                    out.push((c.moment / c.weight) as f32);
                }
                current = Some(Cluster {
                    last: i,
                    weight: w,
                    moment: w * i as f64,
                });
            }
        }
    }
    if let Some(c) = current {
        out.push((c.moment / c.weight) as f32);
    }
    out
}

/// Pick the best evenly spaced subset of `candidates` (sorted ascending).
///
/// Every candidate pair with a gap of at least `min_spacing` seeds a chain
/// that keeps stepping by its running mean spacing and accepts the nearest
/// candidate within `tolerance * spacing`. See [`LineFamily::beats`] for the
/// ranking; on a full tie the earliest seed is kept.
pub(crate) fn best_family(candidates: &[f32], min_spacing: f32, tolerance: f32) -> Option<LineFamily> {
    let mut best: Option<LineFamily> = None;
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            let seed_gap = candidates[j] - candidates[i];
            if seed_gap < min_spacing {
                continue;
            }
            let chain = follow_chain(candidates, i, j, tolerance);
            let family = LineFamily::from_positions(chain);
            if best.as_ref().map_or(true, |b| family.beats(b)) {
                best = Some(family);
            }
        }
    }
    best
}

fn follow_chain(candidates: &[f32], i: usize, j: usize, tolerance: f32) -> Vec<f32> {
    let first = candidates[i];
    let mut chain = vec![first, candidates[j]];
    let mut next = j + 1;
    loop {
        let last = chain[chain.len() - 1];
        let spacing = (last - first) / (chain.len() - 1) as f32;
        let expected = last + spacing;
        let tol = (spacing * tolerance).max(1.0);

        let mut pick: Option<(usize, f32)> = None;
        for (k, &c) in candidates.iter().enumerate().skip(next) {
            if c > expected + tol {
                break;
            }
            let d = (c - expected).abs();
            if d <= tol && pick.map_or(true, |(_, best_d)| d < best_d) {
                pick = Some((k, d));
            }
        }
        match pick {
            Some((k, _)) => {
                chain.push(candidates[k]);
                next = k + 1;
            }
            None => return chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_bins_merge_into_one_line() {
        let mut profile = vec![0.0f32; 40];
        profile[9] = 1.0;
        profile[11] = 1.0;
        profile[29] = 0.9;
        profile[31] = 0.9;
        profile[20] = 0.1;
        let lines = line_candidates(&profile, 0.4, 3);
        assert_eq!(lines, vec![10.0, 30.0]);
    }

    #[test]
    fn empty_profile_has_no_lines() {
        assert!(line_candidates(&[0.0, 0.0, 0.0], 0.5, 2).is_empty());
        assert!(line_candidates(&[], 0.5, 2).is_empty());
    }

    #[test]
    fn longest_regular_chain_wins_over_noise() {
        let mut c: Vec<f32> = (0..9).map(|k| 20.0 + 25.0 * k as f32).collect();
        c.extend([31.0, 140.0, 260.0]);
        c.sort_by(f32::total_cmp);
        let fam = best_family(&c, 8.0, 0.2).expect("family");
        assert_eq!(fam.len(), 9);
        assert!((fam.spacing - 25.0).abs() < 1e-4);
        assert!(fam.variance < 1e-4);
        assert_eq!(fam.first(), 20.0);
        assert_eq!(fam.last(), 220.0);
    }

    #[test]
    fn equal_length_chains_prefer_lower_variance() {
        // Two 4-line groups: one jittery, one exact.
        let c = [0.0, 10.0, 21.0, 30.0, 200.0, 220.0, 240.0, 260.0];
        let fam = best_family(&c, 8.0, 0.15).expect("family");
        assert_eq!(fam.positions, vec![200.0, 220.0, 240.0, 260.0]);
    }

    #[test]
    fn seeds_below_min_spacing_are_ignored() {
        let c = [0.0, 3.0, 6.0, 9.0, 12.0];
        assert!(best_family(&c, 8.0, 0.2).map_or(true, |f| f.len() <= 2));
    }
}
