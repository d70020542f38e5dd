// ============================================
// SGD trainer for biased matrix factorization
// ============================================
//
// For every observation (u, i, r), in stored order, each epoch:
//   pred = mu + bu[u] + bi[i] + p[u]·q[i]
//   err  = r - pred
//   bu[u] += lr * (err - reg * bu[u])
//   bi[i] += lr * (err - reg * bi[i])
//   p[u]  += lr * (err * q[i] - reg * p[u])
//   q[i]  += lr * (err * p[u] - reg * q[i])
//
// Vector updates read the pre-update p[u] and q[i].

use super::FitParams;
use ndarray::{Array1, Array2, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Observation with user and item already mapped to matrix rows
pub(super) type IndexedRating = (usize, usize, f64);

pub(super) struct TrainedFactors {
    pub user_bias: Array1<f64>,
    pub item_bias: Array1<f64>,
    pub user_factors: Array2<f64>,
    pub item_factors: Array2<f64>,
    /// RMSE accumulated during the last epoch (0 when no epoch ran)
    pub training_rmse: f64,
}

pub(super) fn train(
    ratings: &[IndexedRating],
    n_users: usize,
    n_items: usize,
    global_bias: f64,
    params: &FitParams,
) -> TrainedFactors {
    let k = params.factors;
    let lr = params.learning_rate;
    let reg = params.regularization;
    let init = params.init_range;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut user_factors =
        Array2::from_shape_simple_fn((n_users, k), || rng.gen_range(-init..=init));
    let mut item_factors =
        Array2::from_shape_simple_fn((n_items, k), || rng.gen_range(-init..=init));
    let mut user_bias = Array1::<f64>::zeros(n_users);
    let mut item_bias = Array1::<f64>::zeros(n_items);

    let mut training_rmse = 0.0;

    for epoch in 0..params.epochs {
        let mut squared_error = 0.0;

        for &(u, i, rating) in ratings {
            let dot = user_factors.row(u).dot(&item_factors.row(i));
            let predicted = global_bias + user_bias[u] + item_bias[i] + dot;
            let err = rating - predicted;
            squared_error += err * err;

            if params.biased {
                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);
            }

            Zip::from(user_factors.row_mut(u))
                .and(item_factors.row_mut(i))
                .for_each(|p, q| {
                    let (p_old, q_old) = (*p, *q);
                    *p += lr * (err * q_old - reg * p_old);
                    *q += lr * (err * p_old - reg * q_old);
                });
        }

        training_rmse = (squared_error / ratings.len() as f64).sqrt();
        debug!(
            epoch = epoch + 1,
            rmse = training_rmse,
            "SGD epoch completed"
        );
    }

    TrainedFactors {
        user_bias,
        item_bias,
        user_factors,
        item_factors,
        training_rmse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::factorization::MAX_INIT_RANGE;

    #[test]
    fn test_init_is_seeded() {
        let params = FitParams::default().with_factors(4).with_epochs(0);
        let a = train(&[(0, 0, 3.0)], 1, 1, 3.0, &params);
        let b = train(&[(0, 0, 3.0)], 1, 1, 3.0, &params);

        assert_eq!(a.user_factors, b.user_factors);
        assert_eq!(a.item_factors, b.item_factors);
        assert!(a.user_factors.iter().all(|v| v.abs() <= 0.1));
        assert_eq!(a.training_rmse, 0.0);
    }

    #[test]
    fn test_init_at_max_range() {
        let params = FitParams {
            init_range: MAX_INIT_RANGE,
            ..FitParams::default().with_factors(3).with_epochs(0)
        };
        let trained = train(&[(0, 0, 3.0)], 2, 2, 3.0, &params);

        assert!(trained.user_factors.iter().all(|v| v.abs() <= MAX_INIT_RANGE));
        assert!(trained.item_factors.iter().all(|v| v.abs() <= MAX_INIT_RANGE));
    }

    #[test]
    fn test_unbiased_keeps_bias_zero() {
        let params = FitParams::default()
            .with_factors(3)
            .with_epochs(10)
            .with_biased(false);
        let trained = train(&[(0, 0, 5.0), (1, 0, 1.0)], 2, 1, 3.0, &params);

        assert!(trained.user_bias.iter().all(|b| *b == 0.0));
        assert!(trained.item_bias.iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_biases_move_toward_residual() {
        let params = FitParams::default().with_factors(2).with_epochs(50);
        // user 0 rates above the global mean, user 1 below
        let trained = train(&[(0, 0, 5.0), (1, 0, 1.0)], 2, 1, 3.0, &params);

        assert!(trained.user_bias[0] > 0.0);
        assert!(trained.user_bias[1] < 0.0);
    }

    #[test]
    fn test_rmse_decreases() {
        let ratings = [
            (0, 0, 5.0),
            (0, 1, 4.0),
            (1, 0, 4.0),
            (1, 2, 5.0),
            (2, 1, 3.0),
            (2, 2, 4.0),
        ];
        let params = FitParams::default().with_factors(2).with_learning_rate(0.01);

        let short = train(&ratings, 3, 3, 25.0 / 6.0, &params.clone().with_epochs(2));
        let long = train(&ratings, 3, 3, 25.0 / 6.0, &params.with_epochs(200));

        assert!(long.training_rmse < short.training_rmse);
    }
}
