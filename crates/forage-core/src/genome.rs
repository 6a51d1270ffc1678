use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One symbol of the four-letter genome alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base {
    A,
    T,
    G,
    C,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::G, Base::C];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Base::A),
            'T' => Some(Base::T),
            'G' => Some(Base::G),
            'C' => Some(Base::C),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::G => 'G',
            Base::C => 'C',
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Per-symbol contribution to fitness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub a: u32,
    pub t: u32,
    pub g: u32,
    pub c: u32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            a: 4,
            t: 1,
            g: 2,
            c: 3,
        }
    }
}

impl FitnessWeights {
    pub fn weight(&self, base: Base) -> u32 {
        match base {
            Base::A => self.a,
            Base::T => self.t,
            Base::G => self.g,
            Base::C => self.c,
        }
    }

    /// Weighted symbol count of `sequence`.
    pub fn score(&self, sequence: &[Base]) -> u32 {
        sequence
            .iter()
            .map(|&b| self.weight(b))
            .fold(0u32, u32::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    #[error("genome sequence must not be empty")]
    Empty,
    #[error("invalid genome symbol {symbol:?} at index {index}")]
    InvalidSymbol { symbol: char, index: usize },
}

/// Immutable symbol sequence with its fitness computed once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genome {
    sequence: Vec<Base>,
    fitness: u32,
}

impl Genome {
    pub fn new(sequence: Vec<Base>, weights: &FitnessWeights) -> Result<Self, GenomeError> {
        if sequence.is_empty() {
            return Err(GenomeError::Empty);
        }
        let fitness = weights.score(&sequence);
        Ok(Self { sequence, fitness })
    }

    /// Parse a sequence such as `"ATGC"`.
    pub fn parse(text: &str, weights: &FitnessWeights) -> Result<Self, GenomeError> {
        let sequence = text
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                Base::from_char(symbol).ok_or(GenomeError::InvalidSymbol { symbol, index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(sequence, weights)
    }

    /// Uniformly random sequence of `len` symbols.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        len: usize,
        weights: &FitnessWeights,
    ) -> Result<Self, GenomeError> {
        let mut sequence = Vec::with_capacity(len);
        for _ in 0..len {
            sequence.push(Base::random(rng));
        }
        Self::new(sequence, weights)
    }

    pub fn sequence(&self) -> &[Base] {
        &self.sequence
    }

    pub fn fitness(&self) -> u32 {
        self.fitness
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Offspring genome: each position is redrawn uniformly with probability
    /// `probability` (the redraw may land on the same symbol). `self` is untouched.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        probability: f64,
        weights: &FitnessWeights,
    ) -> Genome {
        debug_assert!(
            (0.0..=1.0).contains(&probability),
            "mutation probability must be in [0, 1]"
        );
        let mut sequence = self.sequence.clone();
        for b in &mut sequence {
            if rng.random::<f64>() < probability {
                *b = Base::random(rng);
            }
        }
        let fitness = weights.score(&sequence);
        Genome { sequence, fitness }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.sequence {
            write!(f, "{}", b.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Genome {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &FitnessWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn fitness_of(text: &str) -> u32 {
        text.parse::<Genome>().expect("valid genome").fitness()
    }

    #[test]
    fn fitness_is_weighted_symbol_count() {
        assert_eq!(fitness_of("AAAA"), 16);
        assert_eq!(fitness_of("ATGC"), 10);
        assert_eq!(fitness_of("TTTT"), 4);
        assert_eq!(fitness_of("CG"), 5);
    }

    #[test]
    fn custom_weights_change_fitness() {
        let weights = FitnessWeights {
            a: 0,
            t: 10,
            g: 0,
            c: 0,
        };
        let g = Genome::parse("TTAT", &weights).unwrap();
        assert_eq!(g.fitness(), 30);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<Genome>(), Err(GenomeError::Empty));
        assert_eq!(
            "ATXG".parse::<Genome>(),
            Err(GenomeError::InvalidSymbol {
                symbol: 'X',
                index: 2
            })
        );
        assert!("atgc".parse::<Genome>().is_err());
    }

    #[test]
    fn display_round_trips_sequence_text() {
        assert_eq!("GATTACA".parse::<Genome>().unwrap().to_string(), "GATTACA");
    }

    #[test]
    fn mutation_is_deterministic_for_fixed_seed() {
        let parent: Genome = "ATGCATGCATGC".parse().unwrap();
        let weights = FitnessWeights::default();
        let mut rng_a = ChaCha12Rng::seed_from_u64(123);
        let mut rng_b = ChaCha12Rng::seed_from_u64(123);
        let a = parent.mutate(&mut rng_a, 0.3, &weights);
        let b = parent.mutate(&mut rng_b, 0.3, &weights);
        assert_eq!(a, b);
    }

    #[test]
    fn mutation_preserves_length_and_recomputes_fitness() {
        let weights = FitnessWeights::default();
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        for len in 1..12 {
            let parent = Genome::random(&mut rng, len, &weights).unwrap();
            for p in [0.0, 0.1, 0.5, 0.9, 1.0] {
                let child = parent.mutate(&mut rng, p, &weights);
                assert_eq!(child.len(), len);
                assert_eq!(child.fitness(), weights.score(child.sequence()));
            }
        }
    }

    #[test]
    fn zero_probability_never_changes_a_symbol() {
        let parent: Genome = "ACGTTGCA".parse().unwrap();
        let weights = FitnessWeights::default();
        let mut rng = ChaCha12Rng::seed_from_u64(99);
        for _ in 0..500 {
            assert_eq!(parent.mutate(&mut rng, 0.0, &weights), parent);
        }
    }

    #[test]
    fn full_probability_redraws_every_position() {
        let parent: Genome = "AAAA".parse().unwrap();
        let weights = FitnessWeights::default();
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let mut seen = [[false; 4]; 4];
        for _ in 0..400 {
            let child = parent.mutate(&mut rng, 1.0, &weights);
            for (pos, b) in child.sequence().iter().enumerate() {
                let idx = Base::ALL.iter().position(|x| x == b).unwrap();
                seen[pos][idx] = true;
            }
        }
        assert!(seen.iter().all(|row| row.iter().all(|&s| s)));
    }

    #[test]
    fn mutation_leaves_parent_untouched() {
        let parent: Genome = "GGGG".parse().unwrap();
        let snapshot = parent.clone();
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let _ = parent.mutate(&mut rng, 1.0, &FitnessWeights::default());
        assert_eq!(parent, snapshot);
    }
}
