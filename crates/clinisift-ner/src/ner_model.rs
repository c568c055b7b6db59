//! BERT token classifier using Candle.
//!
//! Emits one raw annotation per labelled word piece; merging into entities
//! is left to [`merge_wordpieces`](crate::merge_wordpieces) and
//! [`resolve_tags`](crate::resolve_tags).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::classifier::{ModelRegistry, TokenClassifier};
use crate::config::ParserConfig;
use crate::entity::TokenAnnotation;
use crate::{NerError, Result};

/// Label the transformers NER pipeline drops by default.
const OUTSIDE_LABEL: &str = "O";

/// A Hugging Face token-classification checkpoint loaded into candle.
pub struct BertTokenClassifier {
    model_id: String,
    model: BertModel,
    tokenizer: Tokenizer,
    classifier: Tensor,
    classifier_bias: Option<Tensor>,
    label_map: HashMap<i64, String>,
    max_length: usize,
    device: Device,
}

impl BertTokenClassifier {
    /// Download (or reuse the cached copy of) `model_id` and load it.
    pub fn load(model_id: &str, max_length: usize, use_gpu: bool) -> Result<Self> {
        let start = Instant::now();
        info!("Loading NER model: {}", model_id);

        let device = if use_gpu {
            Device::cuda_if_available(0).unwrap_or(Device::Cpu)
        } else {
            Device::Cpu
        };
        debug!("Using device: {:?}", device);

        let (bert_config, tokenizer, weights_path, label_map) = Self::download_model(model_id)?;

        info!("Loading model weights from {:?}", weights_path);
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| NerError::ModelLoad(e.to_string()))?
        };

        let model = BertModel::load(vb.pp("bert"), &bert_config)
            .or_else(|_| BertModel::load(vb.clone(), &bert_config))
            .map_err(|e| NerError::ModelLoad(format!("BertModel: {}", e)))?;

        // Classification head weight is [num_labels, hidden]
        let num_labels = label_map.len().max(1);
        let hidden_size = bert_config.hidden_size;
        let head = vb.pp("classifier");
        let classifier = head
            .get((num_labels, hidden_size), "weight")
            .map_err(|e| NerError::ModelLoad(format!("Classifier: {}", e)))?;
        let classifier_bias = head.get(num_labels, "bias").ok();

        info!("NER model {} loaded in {:?}", model_id, start.elapsed());

        Ok(Self {
            model_id: model_id.to_string(),
            model,
            tokenizer,
            classifier,
            classifier_bias,
            label_map,
            max_length,
            device,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn download_model(model_id: &str) -> Result<(Config, Tokenizer, PathBuf, HashMap<i64, String>)> {
        use hf_hub::{Repo, RepoType};

        let api = Api::new().map_err(|e| NerError::Download(format!("API init: {}", e)))?;
        let api_repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = api_repo
            .get("config.json")
            .map_err(|e| NerError::Download(format!("config.json: {}", e)))?;
        let config_content = std::fs::read_to_string(&config_path)?;
        let config_json: serde_json::Value = serde_json::from_str(&config_content)
            .map_err(|e| NerError::Download(format!("Parse config: {}", e)))?;

        let label_map: HashMap<i64, String> = config_json["id2label"]
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let dim = |key: &str, default: u64| config_json[key].as_u64().unwrap_or(default) as usize;
        let bert_config = Config {
            vocab_size: dim("vocab_size", 30522),
            hidden_size: dim("hidden_size", 768),
            num_hidden_layers: dim("num_hidden_layers", 12),
            num_attention_heads: dim("num_attention_heads", 12),
            intermediate_size: dim("intermediate_size", 3072),
            hidden_act: candle_transformers::models::bert::HiddenAct::Gelu,
            hidden_dropout_prob: 0.1,
            max_position_embeddings: dim("max_position_embeddings", 512),
            type_vocab_size: dim("type_vocab_size", 2),
            initializer_range: 0.02,
            layer_norm_eps: config_json["layer_norm_eps"].as_f64().unwrap_or(1e-12),
            pad_token_id: dim("pad_token_id", 0),
            position_embedding_type: candle_transformers::models::bert::PositionEmbeddingType::Absolute,
            use_cache: true,
            classifier_dropout: None,
            model_type: Some("bert".to_string()),
        };

        let tok_path = api_repo
            .get("tokenizer.json")
            .map_err(|e| NerError::Download(format!("tokenizer.json: {}", e)))?;
        debug!("Loading tokenizer from: {:?}", tok_path);
        let tokenizer = Tokenizer::from_file(&tok_path).map_err(|e| NerError::Tokenization(e.to_string()))?;

        let weights_path = api_repo
            .get("model.safetensors")
            .map_err(|e| NerError::Download(format!("Model weights: {}", e)))?;

        Ok((bert_config, tokenizer, weights_path, label_map))
    }

    /// Label every word piece of `sentence`.
    fn predict(&self, sentence: &str) -> Result<Vec<TokenAnnotation>> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(sentence, true)
            .map_err(|e| NerError::Tokenization(e.to_string()))?;

        let seq_len = encoding.get_ids().len().min(self.max_length);
        if seq_len == 0 {
            return Ok(Vec::new());
        }
        let input_ids: Vec<i64> = encoding.get_ids()[..seq_len].iter().map(|&id| id as i64).collect();

        let input_ids = Tensor::new(&input_ids[..], &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::zeros((1, seq_len), DType::I64, &self.device)?;
        let attention_mask = Tensor::ones((1, seq_len), DType::F32, &self.device)?;

        // [1, seq, hidden] -> [seq, num_labels]
        let hidden_states = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let hidden_states = hidden_states.squeeze(0)?;
        let mut logits = hidden_states.matmul(&self.classifier.t()?)?;
        if let Some(bias) = &self.classifier_bias {
            logits = logits.broadcast_add(bias)?;
        }
        let preds = logits.argmax(1)?.to_dtype(DType::I64)?.to_vec1::<i64>()?;

        let tokens = encoding.get_tokens();
        let offsets = encoding.get_offsets();
        let special = encoding.get_special_tokens_mask();

        let mut annotations = Vec::new();
        for (i, &pred) in preds.iter().enumerate() {
            let (tok_start, tok_end) = offsets[i];
            if special[i] == 1 || tok_start >= tok_end {
                continue;
            }
            let label = self.label_map.get(&pred).map(String::as_str).unwrap_or(OUTSIDE_LABEL);
            if label == OUTSIDE_LABEL {
                continue;
            }
            annotations.push(TokenAnnotation::new(label, tok_start, tok_end, tokens[i].clone()));
        }

        debug!(
            "{}: {} labelled tokens of {} in {:?}",
            self.model_id,
            annotations.len(),
            seq_len,
            start.elapsed()
        );
        Ok(annotations)
    }
}

impl TokenClassifier for BertTokenClassifier {
    fn classify(&self, sentence: &str) -> Result<Vec<TokenAnnotation>> {
        self.predict(sentence)
    }
}

impl ModelRegistry {
    /// Load every model named in `config` as a BERT token classifier.
    pub fn from_config_bert(config: &ParserConfig) -> Result<Self> {
        let mut registry = ModelRegistry::new();
        for spec in &config.models {
            info!("Loading {} model: {}...", spec.name, spec.model_id);
            let model = BertTokenClassifier::load(&spec.model_id, config.max_length, config.use_gpu)?;
            registry.register(spec.name.clone(), model);
        }
        Ok(registry)
    }
}
