//! String synthesis from `pattern` constraints.
//!
//! Walks the parsed regex HIR and emits only matching strings, so the
//! pattern is enforced at generation time rather than by post-hoc
//! filtering. Constructs the walk cannot honor (word boundaries, classes
//! matching nothing) fail template construction up front.

use rand::{Rng, RngCore};
use regex_syntax::hir::{Class, Hir, HirKind, Look};

use crate::error::TemplateError;

/// A compiled, generation-ready pattern.
#[derive(Debug)]
pub(crate) struct Pattern {
    hir: Hir,
    repeat_cap: u32,
}

impl Pattern {
    /// Parse and validate `pattern` for generation.
    ///
    /// Invalid regex syntax is a malformed schema; a syntactically valid
    /// pattern containing an element the generator cannot satisfy is an
    /// unsupported one.
    pub(crate) fn compile(
        pattern: &str,
        repeat_cap: u32,
        context: &str,
    ) -> Result<Self, TemplateError> {
        let hir = regex_syntax::Parser::new().parse(pattern).map_err(|e| {
            TemplateError::malformed(context, format!("invalid pattern {pattern:?}: {e}"))
        })?;
        validate(&hir, pattern, context)?;
        Ok(Self { hir, repeat_cap })
    }

    /// Produce one string matching the pattern.
    pub(crate) fn generate(&self, rng: &mut dyn RngCore) -> String {
        let mut out = String::new();
        emit(&self.hir, self.repeat_cap, rng, &mut out);
        out
    }
}

fn validate(hir: &Hir, pattern: &str, context: &str) -> Result<(), TemplateError> {
    match hir.kind() {
        HirKind::Empty | HirKind::Literal(_) => Ok(()),
        HirKind::Class(class) => {
            let empty = match class {
                Class::Unicode(c) => c.ranges().is_empty(),
                Class::Bytes(c) => c.ranges().is_empty(),
            };
            if empty {
                return Err(TemplateError::malformed(
                    context,
                    format!("pattern {pattern:?} contains a class matching nothing"),
                ));
            }
            Ok(())
        }
        // Anchors are no-ops when generating a full match; word boundaries
        // would require context-sensitive emission we do not attempt.
        HirKind::Look(look) => match look {
            Look::Start
            | Look::End
            | Look::StartLF
            | Look::EndLF
            | Look::StartCRLF
            | Look::EndCRLF => Ok(()),
            _ => Err(TemplateError::unsupported_constraint(
                context,
                format!("pattern {pattern:?} contains a word boundary"),
            )),
        },
        HirKind::Repetition(rep) => validate(&rep.sub, pattern, context),
        HirKind::Capture(cap) => validate(&cap.sub, pattern, context),
        HirKind::Concat(parts) | HirKind::Alternation(parts) => {
            for part in parts {
                validate(part, pattern, context)?;
            }
            Ok(())
        }
    }
}

fn emit(hir: &Hir, repeat_cap: u32, rng: &mut dyn RngCore, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => {
            // HIR literals are always valid UTF-8 for unicode patterns.
            out.push_str(&String::from_utf8_lossy(&lit.0));
        }
        HirKind::Class(class) => match class {
            Class::Unicode(c) => {
                let ranges = c.ranges();
                let range = &ranges[rng.gen_range(0..ranges.len())];
                let (lo, hi) = (range.start() as u32, range.end() as u32);
                let picked = rng.gen_range(lo..=hi);
                // Scalar-value ranges never span the surrogate gap, so the
                // fallback is unreachable in practice.
                out.push(char::from_u32(picked).unwrap_or(range.start()));
            }
            Class::Bytes(c) => {
                let ranges = c.ranges();
                let range = &ranges[rng.gen_range(0..ranges.len())];
                out.push(rng.gen_range(range.start()..=range.end()) as char);
            }
        },
        HirKind::Repetition(rep) => {
            let min = rep.min;
            let max = match rep.max {
                Some(max) => max.min(min.saturating_add(repeat_cap)),
                None => min.saturating_add(repeat_cap),
            };
            let count = rng.gen_range(min..=max.max(min));
            for _ in 0..count {
                emit(&rep.sub, repeat_cap, rng, out);
            }
        }
        HirKind::Capture(cap) => emit(&cap.sub, repeat_cap, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                emit(part, repeat_cap, rng, out);
            }
        }
        HirKind::Alternation(parts) => {
            emit(&parts[rng.gen_range(0..parts.len())], repeat_cap, rng, out);
        }
    }
}
