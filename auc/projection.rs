use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

/// Euclidean distance between two equally sized vectors.
pub fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    assert_eq!(a.len(), b.len(), "Dimension mismatch in distance");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Projects `u` onto the L1 ball of the given radius, returning a new vector.
pub fn project_l1(u: ArrayView1<f64>, radius: f64) -> Array1<f64> {
    let mut out = u.to_owned();
    project_l1_in_place(out.view_mut(), radius);
    out
}

/// Projects `u` onto `{x : ||x||_1 <= radius}` in place.
///
/// Sort-based threshold search: with the magnitudes sorted in descending order
/// and their prefix sums `c`, take the largest rank `rho` with
/// `|u|_(rho) * rho > c(rho) - radius`, then soft-threshold every entry by
/// `theta = (c(rho) - radius) / rho`. Points already inside the ball are left
/// untouched. O(d log d).
pub fn project_l1_in_place(mut u: ArrayViewMut1<f64>, radius: f64) {
    let l1: f64 = u.iter().map(|x| x.abs()).sum();
    if l1 <= radius {
        return;
    }

    let mut sorted: Vec<f64> = u.iter().map(|x| x.abs()).collect();
    sorted.sort_unstable_by(|a, b| b.total_cmp(a));

    let mut cumsum = 0.0;
    let mut theta = 0.0;
    for (rank, &magnitude) in sorted.iter().enumerate() {
        cumsum += magnitude;
        let rho = (rank + 1) as f64;
        if magnitude * rho > cumsum - radius {
            theta = (cumsum - radius) / rho;
        }
    }

    u.mapv_inplace(|x| x.signum() * (x.abs() - theta).max(0.0));
}

/// Clips a scalar into `[-radius, radius]`. NaN passes through unchanged.
pub fn project_box(x: f64, radius: f64) -> f64 {
    if x > radius {
        radius
    } else if x < -radius {
        -radius
    } else {
        x
    }
}

/// Projects `v` onto the Euclidean ball of `radius` around `center`, in place.
/// Returns the distance from `center` before projection.
pub fn project_ball(mut v: ArrayViewMut1<f64>, center: ArrayView1<f64>, radius: f64) -> f64 {
    let dist = distance(v.view(), center);
    if dist > radius {
        let scale = radius / dist;
        Zip::from(&mut v)
            .and(&center)
            .for_each(|x, &c| *x = c + (*x - c) * scale);
    }
    dist
}
