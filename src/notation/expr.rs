// puremusic -- a declarative music notation compiler and synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Symbolic frequencies.
//!
//! - `TET <steps per octave> [<reference Hz>] <step> <octave>` is a step of an equal temperament.
//! - `OVT <base> <partial> [<octave>]` is a harmonic partial of `<base>`,
//!   which is either a frequency in Hz or a parenthesized `(TET ...)` expression.

use crate::synth::tuning::{self, EqualTemperament};

#[derive(Debug, Clone, PartialEq)]
pub enum FreqExpr {
    Hz(f64),
    Tet {
        temperament: EqualTemperament,
        step: i32,
        octave: i32,
    },
    Ovt {
        base: Box<FreqExpr>,
        partial: i32,
        octave: i32,
    },
}

impl FreqExpr {
    /// Frequency in Hz.
    pub fn eval(&self) -> f64 {
        match self {
            FreqExpr::Hz(hz) => *hz,
            FreqExpr::Tet {
                temperament,
                step,
                octave,
            } => temperament.frequency(*step, *octave),
            FreqExpr::Ovt {
                base,
                partial,
                octave,
            } => tuning::partial(base.eval(), *partial, *octave),
        }
    }

    /// Parse a `TET` or `OVT` expression. The error describes what is wrong with it.
    ///
    /// ```
    /// use puremusic::notation::expr::FreqExpr;
    /// let eval = |s| FreqExpr::parse(s).map(|e| e.eval());
    /// assert_eq!(eval("TET 12 0 0"), Ok(16.35));
    /// assert_eq!(eval("OVT 440.0 2"), Ok(880.0));
    /// assert_eq!(eval("OVT (TET 12 440 0 0) 3 -1"), Ok(660.0));
    /// assert!(eval("440").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<FreqExpr, String> {
        if let Some(args) = input.strip_prefix("TET ") {
            Self::parse_tet(args)
        } else if let Some(args) = input.strip_prefix("OVT ") {
            Self::parse_ovt(args)
        } else {
            Err("expected a TET or OVT expression".to_string())
        }
    }

    fn parse_tet(args: &str) -> Result<FreqExpr, String> {
        let args: Vec<&str> = args.split_whitespace().collect();
        let (temperament, step, octave) = match args[..] {
            [steps, step, octave] => (EqualTemperament::new(int(steps)?), step, octave),
            [steps, reference, step, octave] => (
                EqualTemperament::with_reference(int(steps)?, float(reference)?),
                step,
                octave,
            ),
            _ => {
                return Err(format!(
                    "TET takes 3 or 4 arguments, {} provided",
                    args.len()
                ))
            }
        };
        if temperament.steps_per_octave == 0 {
            return Err("TET needs at least one step per octave".to_string());
        }
        Ok(FreqExpr::Tet {
            temperament,
            step: int(step)?,
            octave: int(octave)?,
        })
    }

    fn parse_ovt(args: &str) -> Result<FreqExpr, String> {
        let (base, rest) = if let Some(nested) = args.strip_prefix("(TET ") {
            let close = nested
                .find(')')
                .ok_or_else(|| "unclosed (TET expression".to_string())?;
            (Self::parse_tet(&nested[..close])?, &nested[close + 1..])
        } else {
            let args = args.trim_start();
            let split = args.find(char::is_whitespace).unwrap_or_else(|| args.len());
            (FreqExpr::Hz(float(&args[..split])?), &args[split..])
        };

        let rest: Vec<&str> = rest.split_whitespace().collect();
        let (partial, octave) = match rest[..] {
            [partial] => (int(partial)?, 0),
            [partial, octave] => (int(partial)?, int(octave)?),
            _ => {
                return Err(format!(
                    "OVT takes 2 or 3 arguments, {} provided",
                    rest.len() + 1
                ))
            }
        };
        Ok(FreqExpr::Ovt {
            base: Box::new(base),
            partial,
            octave,
        })
    }
}

fn int(arg: &str) -> Result<i32, String> {
    arg.parse()
        .map_err(|err| format!("{:?} is not an integer: {}", arg, err))
}

fn float(arg: &str) -> Result<f64, String> {
    arg.parse()
        .map_err(|err| format!("{:?} is not a number: {}", arg, err))
}

#[cfg(test)]
mod test {
    use super::*;

    fn eval(input: &str) -> Result<f64, String> {
        FreqExpr::parse(input).map(|e| e.eval())
    }

    #[test]
    fn equal_temperament() {
        assert_eq!(eval("TET 12 0 0"), Ok(16.35));
        assert_eq!(eval("TET 12 0 4"), Ok(261.6));
        assert_eq!(eval("TET 12 440.0 0 0"), Ok(440.0));
        assert_eq!(eval("TET 24 440 24 -1"), Ok(440.0));
        let a4 = eval("TET 12 9 4").unwrap();
        assert!((a4 - 440.0).abs() < 0.1);
        // extra whitespace between arguments is fine
        assert_eq!(eval("TET  12   0 1"), Ok(32.7));
    }

    #[test]
    fn overtones() {
        assert_eq!(eval("OVT 440.0 2"), Ok(880.0));
        assert_eq!(eval("OVT 100 3 1"), Ok(600.0));
        assert_eq!(eval("OVT (TET 12 0 0) 2"), Ok(32.7));
        assert_eq!(eval("OVT (TET 12 0 0)2 1"), Ok(65.4));
    }

    #[test]
    fn malformed() {
        assert_eq!(
            eval("TET 12 0"),
            Err("TET takes 3 or 4 arguments, 2 provided".to_string())
        );
        assert_eq!(
            eval("OVT 440"),
            Err("OVT takes 2 or 3 arguments, 1 provided".to_string())
        );
        assert_eq!(
            eval("OVT 440 1 2 3"),
            Err("OVT takes 2 or 3 arguments, 4 provided".to_string())
        );
        assert_eq!(
            eval("TET 0 1 1"),
            Err("TET needs at least one step per octave".to_string())
        );
        assert_eq!(
            eval("OVT (TET 12 0 0 2"),
            Err("unclosed (TET expression".to_string())
        );
        assert!(eval("TET 12 1.5 0").is_err());
        assert!(eval("OVT abc 2").is_err());
        assert!(eval("tet 12 0 0").is_err());
        assert!(eval("TET").is_err());
        expect_test::expect![[r#"Err("\"x\" is not an integer: invalid digit found in string")"#]]
            .assert_eq(&format!("{:?}", eval("TET x 0 0")));
    }
}
