use crate::traits::{Scalar, Stepper, VectorField};

fn zeros<T: Scalar>(dim: usize) -> Vec<T> {
    vec![T::zero(); dim]
}

/// tmp = state + dt * sum(coefs[i] * stages[i])
fn form_stage_input<T: Scalar>(
    tmp: &mut [T],
    state: &[T],
    dt: T,
    coefs: &[f64],
    stages: &[&[T]],
) {
    for i in 0..state.len() {
        let mut acc = T::zero();
        for (c, k) in coefs.iter().zip(stages.iter()) {
            acc = acc + T::from_f64(*c).unwrap() * k[i];
        }
        tmp[i] = state[i] + dt * acc;
    }
}

/// Classic fourth-order Runge-Kutta stepper.
pub struct Rk4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> Rk4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: zeros(dim),
            k2: zeros(dim),
            k3: zeros(dim),
            k4: zeros(dim),
            tmp: zeros(dim),
        }
    }
}

impl<T: Scalar> Stepper<T> for Rk4<T> {
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let third = T::from_f64(1.0 / 3.0).unwrap();

        field.eval(t0, state, &mut self.k1);

        form_stage_input(&mut self.tmp, state, dt, &[0.5], &[self.k1.as_slice()]);
        field.eval(t0 + dt * half, &self.tmp, &mut self.k2);

        form_stage_input(&mut self.tmp, state, dt, &[0.5], &[self.k2.as_slice()]);
        field.eval(t0 + dt * half, &self.tmp, &mut self.k3);

        form_stage_input(&mut self.tmp, state, dt, &[1.0], &[self.k3.as_slice()]);
        field.eval(t0 + dt, &self.tmp, &mut self.k4);

        for i in 0..state.len() {
            state[i] = state[i]
                + dt * (sixth * (self.k1[i] + self.k4[i]) + third * (self.k2[i] + self.k3[i]));
        }

        *t = t0 + dt;
    }
}

/// Tsitouras 5(4) stepper, fixed step (the fifth-order update only).
pub struct Tsit5<T: Scalar> {
    stages: Vec<Vec<T>>,
    tmp: Vec<T>,
}

// Tsit5 Butcher tableau.
const TSIT5_C: [f64; 5] = [0.161, 0.327, 0.9, 0.9800255409045097, 1.0];
const TSIT5_A2: [f64; 1] = [0.161];
const TSIT5_A3: [f64; 2] = [-0.008480655492356989, 0.335480655492357];
const TSIT5_A4: [f64; 3] = [2.898, -6.359447987781783, 4.361447987781783];
const TSIT5_A5: [f64; 4] = [
    5.325864858437957,
    -11.748883564062828,
    7.495539342889693,
    -0.09249506636030195,
];
const TSIT5_A6: [f64; 5] = [
    5.86145544294642,
    -12.92096931784711,
    8.159367898576159,
    -0.071584973281401,
    -0.02826857949054663,
];
const TSIT5_B: [f64; 6] = [
    0.09646076681806523,
    0.01,
    0.4798896504144996,
    1.379008574103742,
    -3.290069515436099,
    2.324710524099774,
];

impl<T: Scalar> Tsit5<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            stages: (0..6).map(|_| zeros(dim)).collect(),
            tmp: zeros(dim),
        }
    }
}

impl<T: Scalar> Stepper<T> for Tsit5<T> {
    fn step(&mut self, field: &impl VectorField<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;
        let rows: [&[f64]; 5] = [&TSIT5_A2, &TSIT5_A3, &TSIT5_A4, &TSIT5_A5, &TSIT5_A6];

        field.eval(t0, state, &mut self.stages[0]);

        for (stage, (&row, &c)) in rows.iter().zip(TSIT5_C.iter()).enumerate() {
            let (done, rest) = self.stages.split_at_mut(stage + 1);
            let inputs: Vec<&[T]> = done.iter().map(|k| k.as_slice()).collect();
            form_stage_input(&mut self.tmp, state, dt, row, &inputs);
            field.eval(t0 + dt * T::from_f64(c).unwrap(), &self.tmp, &mut rest[0]);
        }

        for i in 0..state.len() {
            let mut acc = T::zero();
            for (b, k) in TSIT5_B.iter().zip(self.stages.iter()) {
                acc = acc + T::from_f64(*b).unwrap() * k[i];
            }
            state[i] = state[i] + dt * acc;
        }

        *t = t0 + dt;
    }
}
