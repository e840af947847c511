//! The numeric model federated-learning actors train and evaluate.
//!
//! This crate's subject is the orchestration around training, not the
//! numeric model itself. [`Classifier`] is the seam a real implementation
//! plugs into; [`LinearSoftmax`] is a reference implementation over an
//! in-memory synthetic dataset, used by worker/evaluator/gossip-peer
//! tests and examples.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Loss/accuracy pair reported after a training epoch or an evaluation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub loss: f32,
    pub accuracy: f32,
}

/// A model that can report/accept a weight snapshot, train one local epoch,
/// and evaluate itself. `W` is `classes x features`, `b` is one bias per
/// class.
pub trait Classifier: Send {
    fn weights(&self) -> (Vec<Vec<f32>>, Vec<f32>);
    fn set_weights(&mut self, weights: Vec<Vec<f32>>, bias: Vec<f32>);

    /// Run one local epoch over `batch_size`-sized shuffled batches at
    /// learning rate `lr`. `prox = Some((mu, w_ref, b_ref))` adds a FedProx
    /// penalty pulling the local weights back toward the received global
    /// snapshot.
    fn train_epoch(
        &mut self,
        batch_size: usize,
        lr: f32,
        prox: Option<(f32, Vec<Vec<f32>>, Vec<f32>)>,
    ) -> Metrics;

    fn evaluate(&self) -> Metrics;

    /// Number of training samples this instance owns, used as the FedAvg
    /// weight.
    fn num_samples(&self) -> usize;
}

/// Linear softmax classifier over a synthetic, linearly-separable-ish
/// dataset generated at construction time. Not the subject of this crate's
/// engineering effort; it exists so worker/evaluator/gossip-peer code has
/// something concrete to call.
pub struct LinearSoftmax {
    num_classes: usize,
    num_features: usize,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    features: Vec<Vec<f32>>,
    labels: Vec<usize>,
    eval_features: Vec<Vec<f32>>,
    eval_labels: Vec<usize>,
    rng: SmallRng,
}

impl LinearSoftmax {
    /// Build a classifier with `num_samples` synthetic training rows and
    /// `num_samples / 4` held-out rows, generated from a fixed ground-truth
    /// weight matrix plus Gaussian-ish noise so classes are separable but
    /// not trivially so.
    pub fn new(seed: u64, num_classes: usize, num_features: usize, num_samples: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let ground_truth: Vec<Vec<f32>> = (0..num_classes)
            .map(|_| (0..num_features).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect();

        let gen_split = |rng: &mut SmallRng, n: usize| -> (Vec<Vec<f32>>, Vec<usize>) {
            let mut features = Vec::with_capacity(n);
            let mut labels = Vec::with_capacity(n);
            for _ in 0..n {
                let row: Vec<f32> = (0..num_features).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let scores: Vec<f32> = ground_truth
                    .iter()
                    .map(|class_w| {
                        class_w.iter().zip(&row).map(|(w, x)| w * x).sum::<f32>()
                            + rng.gen_range(-0.1..0.1)
                    })
                    .collect();
                let label = argmax(&scores);
                features.push(row);
                labels.push(label);
            }
            (features, labels)
        };

        let (features, labels) = gen_split(&mut rng, num_samples);
        let (eval_features, eval_labels) = gen_split(&mut rng, (num_samples / 4).max(1));

        Self {
            num_classes,
            num_features,
            weights: vec![vec![0.0; num_features]; num_classes],
            bias: vec![0.0; num_classes],
            features,
            labels,
            eval_features,
            eval_labels,
            rng,
        }
    }

    fn forward(&self, x: &[f32]) -> Vec<f32> {
        softmax(&raw_scores(&self.weights, &self.bias, x))
    }
}

fn raw_scores(weights: &[Vec<f32>], bias: &[f32], x: &[f32]) -> Vec<f32> {
    weights
        .iter()
        .zip(bias)
        .map(|(w, b)| w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f32>() + b)
        .collect()
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|e| e / sum.max(f32::EPSILON)).collect()
}

fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

impl Classifier for LinearSoftmax {
    fn weights(&self) -> (Vec<Vec<f32>>, Vec<f32>) {
        (self.weights.clone(), self.bias.clone())
    }

    fn set_weights(&mut self, weights: Vec<Vec<f32>>, bias: Vec<f32>) {
        self.weights = weights;
        self.bias = bias;
    }

    fn train_epoch(
        &mut self,
        batch_size: usize,
        lr: f32,
        prox: Option<(f32, Vec<Vec<f32>>, Vec<f32>)>,
    ) -> Metrics {
        let mut order: Vec<usize> = (0..self.features.len()).collect();
        order.shuffle(&mut self.rng);

        let mut total_loss = 0.0;
        let mut correct = 0usize;

        for batch in order.chunks(batch_size.max(1)) {
            let mut grad_w = vec![vec![0.0f32; self.num_features]; self.num_classes];
            let mut grad_b = vec![0.0f32; self.num_classes];

            for &idx in batch {
                let x = &self.features[idx];
                let y = self.labels[idx];
                let probs = self.forward(x);

                total_loss += -probs[y].max(f32::EPSILON).ln();
                if argmax(&probs) == y {
                    correct += 1;
                }

                for class in 0..self.num_classes {
                    let target = if class == y { 1.0 } else { 0.0 };
                    let error = probs[class] - target;
                    for (g, xi) in grad_w[class].iter_mut().zip(x) {
                        *g += error * xi;
                    }
                    grad_b[class] += error;
                }
            }

            let n = batch.len().max(1) as f32;
            if let Some((mu, ref_w, ref_b)) = &prox {
                for class in 0..self.num_classes {
                    for feature in 0..self.num_features {
                        grad_w[class][feature] +=
                            mu * (self.weights[class][feature] - ref_w[class][feature]);
                    }
                    grad_b[class] += mu * (self.bias[class] - ref_b[class]);
                }
            }

            for class in 0..self.num_classes {
                for feature in 0..self.num_features {
                    self.weights[class][feature] -= lr * grad_w[class][feature] / n;
                }
                self.bias[class] -= lr * grad_b[class] / n;
            }
        }

        Metrics {
            loss: total_loss / self.labels.len().max(1) as f32,
            accuracy: correct as f32 / self.labels.len().max(1) as f32,
        }
    }

    fn evaluate(&self) -> Metrics {
        let mut total_loss = 0.0;
        let mut correct = 0usize;
        for (x, &y) in self.eval_features.iter().zip(&self.eval_labels) {
            let probs = self.forward(x);
            total_loss += -probs[y].max(f32::EPSILON).ln();
            if argmax(&probs) == y {
                correct += 1;
            }
        }
        Metrics {
            loss: total_loss / self.eval_labels.len().max(1) as f32,
            accuracy: correct as f32 / self.eval_labels.len().max(1) as f32,
        }
    }

    fn num_samples(&self) -> usize {
        self.features.len()
    }
}
