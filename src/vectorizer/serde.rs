use serde::{ser::SerializeStruct, Deserialize, Serialize};

use crate::vectorizer::{tfidf::{DefaultTFIDFEngine, TFIDFEngine}, IDFVector, TFIDFParams, TFIDFVectorizer};

/// Deserialization form of `TFIDFVectorizer`.
/// Holds no analyzer state; `into_tf_idf_vectorizer` validates and rebuilds it.
#[derive(Debug, Deserialize)]
pub struct TFIDFData {
    pub params: TFIDFParams,
    /// terms in column order
    pub vocabulary: Vec<String>,
    pub idf: IDFVector,
}

impl TFIDFData {
    /// Convert into a usable vectorizer.
    /// Fails if the vocabulary is unsorted or duplicated, or the idf length differs.
    pub fn into_tf_idf_vectorizer<E>(self) -> Result<TFIDFVectorizer<E>, String>
    where
        E: TFIDFEngine,
    {
        self.params.validate().map_err(|e| e.to_string())?;
        if !self.vocabulary.windows(2).all(|w| w[0] < w[1]) {
            return Err("vocabulary is not strictly sorted".to_string());
        }
        if self.idf.idf_vec.len() != self.vocabulary.len() {
            return Err(format!(
                "idf has {} weights for {} terms",
                self.idf.idf_vec.len(),
                self.vocabulary.len()
            ));
        }
        if let Some(w) = self.idf.idf_vec.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(format!("invalid idf weight {w}"));
        }
        let vocabulary = self
            .vocabulary
            .into_iter()
            .map(String::into_boxed_str)
            .collect();
        Ok(TFIDFVectorizer::from_parts(self.params, vocabulary, self.idf))
    }
}

impl<E> Serialize for TFIDFVectorizer<E>
where
    E: TFIDFEngine,
{
    /// Analyzer state is rebuilt from params, so only params, vocabulary and idf are written.
    /// Use `TFIDFData` to deserialize.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let vocabulary: Vec<&str> = self.vocabulary.iter().map(|t| t.as_ref()).collect();
        let mut state = serializer.serialize_struct("TFIDFVectorizer", 3)?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("vocabulary", &vocabulary)?;
        state.serialize_field("idf", &self.idf_cache)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbor_roundtrip_reproduces_transform() {
        let mut v: TFIDFVectorizer = TFIDFVectorizer::new(TFIDFParams::default()).unwrap();
        v.fit(&["red shoes for running", "blue shoes for walking", "red hat"]).unwrap();

        let bytes = serde_cbor::to_vec(&v).unwrap();
        let data: TFIDFData = serde_cbor::from_slice(&bytes).unwrap();
        let back: TFIDFVectorizer<DefaultTFIDFEngine> = data.into_tf_idf_vectorizer().unwrap();

        assert_eq!(back.vocabulary, v.vocabulary);
        assert_eq!(back.idf_cache, v.idf_cache);
        assert_eq!(back.transform_one("red running shoes"), v.transform_one("red running shoes"));
    }

    #[test]
    fn rejects_mismatched_idf() {
        let data = TFIDFData {
            params: TFIDFParams::default(),
            vocabulary: vec!["a".into(), "b".into()],
            idf: IDFVector { idf_vec: vec![1.0], doc_num: 1 },
        };
        assert!(data.into_tf_idf_vectorizer::<DefaultTFIDFEngine>().is_err());

        let data = TFIDFData {
            params: TFIDFParams::default(),
            vocabulary: vec!["b".into(), "a".into()],
            idf: IDFVector { idf_vec: vec![1.0, 1.0], doc_num: 1 },
        };
        assert!(data.into_tf_idf_vectorizer::<DefaultTFIDFEngine>().is_err());
    }
}
