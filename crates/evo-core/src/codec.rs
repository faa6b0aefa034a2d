use evo_error::{EngineResult, evo_err};

/// Converts a genotype to and from the bytes carried on the wire. The engine
/// never inspects `G`; it only ever asks the codec to round-trip it (spec
/// section 3: `decode(encode(x))` must be equivalent to `x`).
pub trait Codec<G>: Send + Sync {
    fn encode(&self, genotype: &G) -> EngineResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> EngineResult<G>;
}

/// Converts a `Fitness` to and from the bytes carried on the wire.
pub trait FitnessCodec: Send + Sync {
    fn encode(&self, fitness: &crate::Fitness) -> EngineResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> EngineResult<crate::Fitness>;
}

/// Plain 8-byte little-endian encoding. This is the default `FitnessCodec`
/// since fitness is always a single `f64` regardless of what the genotype
/// looks like.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFitnessCodec;

impl FitnessCodec for PlainFitnessCodec {
    fn encode(&self, fitness: &crate::Fitness) -> EngineResult<Vec<u8>> {
        Ok(fitness.value().to_le_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> EngineResult<crate::Fitness> {
        let array: [u8; 8] = bytes.try_into().map_err(|_| {
            evo_err!(
                Decode: "expected 8 bytes for a fitness value, got {}",
                bytes.len()
            )
        })?;
        Ok(crate::Fitness::new(f64::from_le_bytes(array)))
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};
    use std::marker::PhantomData;

    /// A `Codec<G>` backed by `serde_json`, for genotypes that derive
    /// `Serialize`/`Deserialize`. This is the default when the `serde`
    /// feature is enabled; a caller with a more compact wire format is free
    /// to supply its own `Codec` impl instead.
    pub struct JsonCodec<G> {
        _marker: PhantomData<fn() -> G>,
    }

    impl<G> JsonCodec<G> {
        pub fn new() -> Self {
            JsonCodec {
                _marker: PhantomData,
            }
        }
    }

    impl<G> Default for JsonCodec<G> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<G> Codec<G> for JsonCodec<G>
    where
        G: Serialize + DeserializeOwned + Send + Sync,
    {
        fn encode(&self, genotype: &G) -> EngineResult<Vec<u8>> {
            serde_json::to_vec(genotype)
                .map_err(|e| evo_err!(Decode: "failed to encode genotype: {e}"))
        }

        fn decode(&self, bytes: &[u8]) -> EngineResult<G> {
            serde_json::from_slice(bytes)
                .map_err(|e| evo_err!(Decode: "failed to decode genotype: {e}"))
        }
    }
}

#[cfg(feature = "serde")]
pub use json::JsonCodec;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fitness;

    #[test]
    fn plain_fitness_codec_round_trips() {
        let codec = PlainFitnessCodec;
        let fitness = Fitness::new(3.5);
        let bytes = codec.encode(&fitness).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, fitness);
    }

    #[test]
    fn plain_fitness_codec_rejects_wrong_length() {
        let codec = PlainFitnessCodec;
        assert!(codec.decode(&[0u8; 3]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_codec_round_trips_vec_genotype() {
        let codec: JsonCodec<Vec<i32>> = JsonCodec::new();
        let genotype = vec![1, 2, 3];
        let bytes = codec.encode(&genotype).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, genotype);
    }
}
