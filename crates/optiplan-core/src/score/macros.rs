//! Macros shared by the level-based score types.

/// Field-wise `PartialOrd`, `Ord`, `Add`, `Sub` and `Neg`.
///
/// Ordering is lexicographic in field declaration order.
macro_rules! level_score_ops {
    ($name:ident { $($level:ident),+ }) => {
        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $( .then_with(|| self.$level.cmp(&other.$level)) )+
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self { $( $level: self.$level + rhs.$level ),+ }
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self { $( $level: self.$level - rhs.$level ),+ }
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self { $( $level: -self.$level ),+ }
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::default(), |acc, s| acc + s)
            }
        }
    };
}

/// `multiply`, `divide` and `abs` bodies for use inside `impl Score`.
macro_rules! level_score_scale {
    ($($level:ident),+) => {
        fn multiply(&self, multiplicand: f64) -> Self {
            Self { $( $level: (self.$level as f64 * multiplicand).round() as i64 ),+ }
        }

        fn divide(&self, divisor: f64) -> Self {
            Self { $( $level: (self.$level as f64 / divisor).round() as i64 ),+ }
        }

        fn abs(&self) -> Self {
            Self { $( $level: self.$level.abs() ),+ }
        }
    };
}

/// `Display` and `ParseableScore` for the `"<n><label>/<n><label>"` format.
macro_rules! level_score_text {
    ($name:ident { $($level:ident => $label:literal),+ }) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let parts: &[String] = &[ $( format!("{}{}", self.$level, $label) ),+ ];
                f.write_str(&parts.join("/"))
            }
        }

        impl $crate::score::ParseableScore for $name {
            fn parse(s: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let mut parts = s.trim().split('/');
                $(
                    let $level = {
                        let part = parts.next().map(str::trim).ok_or_else(|| {
                            $crate::score::ScoreParseError::new(format!(
                                "'{}' is missing the {} level", s, $label
                            ))
                        })?;
                        let digits = part.strip_suffix($label).ok_or_else(|| {
                            $crate::score::ScoreParseError::new(format!(
                                "'{}' should end with '{}'", part, $label
                            ))
                        })?;
                        digits.parse::<i64>().map_err(|e| {
                            $crate::score::ScoreParseError::new(format!(
                                "'{}' is not a valid {} level: {}", digits, $label, e
                            ))
                        })?
                    };
                )+
                if parts.next().is_some() {
                    return Err($crate::score::ScoreParseError::new(format!(
                        "'{}' has too many levels for {}", s, stringify!($name)
                    )));
                }
                Ok(Self { $( $level ),+ })
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }
    };
}
