//! Sentence embeddings from a BERT-family encoder using Hugging Face Candle
//!
//! Defaults target `sentence-transformers/all-MiniLM-L6-v2` (384 dimensions),
//! but any BERT-architecture checkpoint with the standard file layout works:
//!
//! - `config.json` - model hyperparameters
//! - `tokenizer.json` - tokenizer definition
//! - `model.safetensors` - weights
//!
//! Output vectors are mean-pooled over tokens and L2-normalized.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{embedding, layer_norm, linear, Activation, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::embeddings::{embed_dense, Embedder};
use crate::error::{Result, SimilarityError};
use crate::matrix::DenseMatrix;

/// Hugging Face repository used by [`SentenceEncoder::download`]
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Encoder hyperparameters read from `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct BertConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    #[serde(default = "default_hidden_act")]
    pub hidden_act: String,
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
}

fn default_hidden_act() -> String {
    "gelu".to_string()
}

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

impl Default for BertConfig {
    fn default() -> Self {
        // all-MiniLM-L6-v2
        Self {
            vocab_size: 30522,
            hidden_size: 384,
            num_hidden_layers: 6,
            num_attention_heads: 12,
            intermediate_size: 1536,
            hidden_act: default_hidden_act(),
            max_position_embeddings: 512,
            type_vocab_size: default_type_vocab_size(),
            layer_norm_eps: default_layer_norm_eps(),
        }
    }
}

struct Embeddings {
    word: Embedding,
    position: Embedding,
    token_type: Embedding,
    layer_norm: LayerNorm,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &BertConfig) -> Result<Self> {
        Ok(Self {
            word: embedding(config.vocab_size, config.hidden_size, vb.pp("word_embeddings"))?,
            position: embedding(
                config.max_position_embeddings,
                config.hidden_size,
                vb.pp("position_embeddings"),
            )?,
            token_type: embedding(
                config.type_vocab_size,
                config.hidden_size,
                vb.pp("token_type_embeddings"),
            )?,
            layer_norm: layer_norm(config.hidden_size, config.layer_norm_eps, vb.pp("LayerNorm"))?,
        })
    }

    fn forward(&self, input_ids: &Tensor, token_type_ids: &Tensor) -> Result<Tensor> {
        let seq_len = input_ids.dim(1)?;
        let position_ids = Tensor::arange(0u32, seq_len as u32, input_ids.device())?.unsqueeze(0)?;

        let sum = (self.word.forward(input_ids)? + self.token_type.forward(token_type_ids)?)?;
        let sum = sum.broadcast_add(&self.position.forward(&position_ids)?)?;
        Ok(self.layer_norm.forward(&sum)?)
    }
}

struct SelfAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    output: Linear,
    output_norm: LayerNorm,
    num_heads: usize,
    head_size: usize,
}

impl SelfAttention {
    fn load(vb: VarBuilder, config: &BertConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        let attention = vb.pp("self");
        let output = vb.pp("output");
        Ok(Self {
            query: linear(hidden, hidden, attention.pp("query"))?,
            key: linear(hidden, hidden, attention.pp("key"))?,
            value: linear(hidden, hidden, attention.pp("value"))?,
            output: linear(hidden, hidden, output.pp("dense"))?,
            output_norm: layer_norm(hidden, config.layer_norm_eps, output.pp("LayerNorm"))?,
            num_heads: config.num_attention_heads,
            head_size: hidden / config.num_attention_heads,
        })
    }

    /// [batch, seq, hidden] -> [batch, heads, seq, head_size]
    fn split_heads(&self, x: &Tensor) -> Result<Tensor> {
        let (batch, seq, _) = x.dims3()?;
        Ok(x.reshape((batch, seq, self.num_heads, self.head_size))?
            .transpose(1, 2)?
            .contiguous()?)
    }

    fn forward(&self, hidden: &Tensor) -> Result<Tensor> {
        let (batch, seq, width) = hidden.dims3()?;
        let q = self.split_heads(&self.query.forward(hidden)?)?;
        let k = self.split_heads(&self.key.forward(hidden)?)?;
        let v = self.split_heads(&self.value.forward(hidden)?)?;

        // Single unpadded sequence, so no attention mask is needed
        let scores = (q.matmul(&k.t()?.contiguous()?)? / (self.head_size as f64).sqrt())?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;
        let context = probs
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, seq, width))?;

        let projected = self.output.forward(&context)?;
        Ok(self.output_norm.forward(&(projected + hidden)?)?)
    }
}

struct EncoderLayer {
    attention: SelfAttention,
    intermediate: Linear,
    activation: Activation,
    output: Linear,
    output_norm: LayerNorm,
}

impl EncoderLayer {
    fn load(vb: VarBuilder, config: &BertConfig) -> Result<Self> {
        let activation = match config.hidden_act.as_str() {
            "relu" => Activation::Relu,
            _ => Activation::Gelu,
        };
        Ok(Self {
            attention: SelfAttention::load(vb.pp("attention"), config)?,
            intermediate: linear(
                config.hidden_size,
                config.intermediate_size,
                vb.pp("intermediate").pp("dense"),
            )?,
            activation,
            output: linear(
                config.intermediate_size,
                config.hidden_size,
                vb.pp("output").pp("dense"),
            )?,
            output_norm: layer_norm(
                config.hidden_size,
                config.layer_norm_eps,
                vb.pp("output").pp("LayerNorm"),
            )?,
        })
    }

    fn forward(&self, hidden: &Tensor) -> Result<Tensor> {
        let attended = self.attention.forward(hidden)?;
        let expanded = self.activation.forward(&self.intermediate.forward(&attended)?)?;
        let contracted = self.output.forward(&expanded)?;
        Ok(self.output_norm.forward(&(contracted + attended)?)?)
    }
}

/// Local BERT-family sentence encoder
pub struct SentenceEncoder {
    embeddings: Embeddings,
    layers: Vec<EncoderLayer>,
    tokenizer: Tokenizer,
    config: BertConfig,
    device: Device,
}

impl SentenceEncoder {
    /// Load the encoder from a model directory
    pub fn load(model_path: &Path) -> Result<Self> {
        // Prefer CUDA, then Metal, then CPU
        let device = if candle_core::utils::cuda_is_available() {
            Device::new_cuda(0)?
        } else if candle_core::utils::metal_is_available() {
            Device::new_metal(0)?
        } else {
            Device::Cpu
        };

        tracing::info!("Loading sentence encoder on device: {:?}", device);

        let config_path = require_file(model_path, "config.json")?;
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)
            .map_err(|e| SimilarityError::Model(format!("Failed to parse config.json: {e}")))?;

        tracing::info!(
            "Loaded config: {} layers, {} hidden size, {} attention heads",
            config.num_hidden_layers,
            config.hidden_size,
            config.num_attention_heads
        );

        let tokenizer_path = require_file(model_path, "tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| SimilarityError::Model(format!("Failed to load tokenizer: {e}")))?;

        let weights_path = require_file(model_path, "model.safetensors")?;
        tracing::info!("Loading model weights from {}", weights_path.display());

        // SAFETY: the weights file is memory-mapped read-only and not modified while loaded
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };

        // Sentence-transformer exports have bare keys; full BERT exports nest under "bert"
        let vb = if vb.contains_tensor("embeddings.word_embeddings.weight") {
            vb
        } else {
            vb.pp("bert")
        };

        let embeddings = Embeddings::load(vb.pp("embeddings"), &config)?;
        let encoder = vb.pp("encoder").pp("layer");
        let layers = (0..config.num_hidden_layers)
            .map(|i| EncoderLayer::load(encoder.pp(i), &config))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Sentence encoder loaded successfully");

        Ok(Self {
            embeddings,
            layers,
            tokenizer,
            config,
            device,
        })
    }

    /// Download a model from the Hugging Face Hub and return its local directory
    pub fn download(repo_id: &str) -> Result<PathBuf> {
        use hf_hub::api::sync::Api;

        tracing::info!("Downloading {} from Hugging Face Hub...", repo_id);

        let hub_err = |e: hf_hub::api::sync::ApiError| SimilarityError::Model(e.to_string());
        let repo = Api::new().map_err(hub_err)?.model(repo_id.to_string());

        let config = repo.get("config.json").map_err(hub_err)?;
        repo.get("tokenizer.json").map_err(hub_err)?;
        repo.get("model.safetensors").map_err(hub_err)?;

        config
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| SimilarityError::Model("Hub cache path has no parent".to_string()))
    }

    /// Embed one text into a unit-length vector
    pub fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| SimilarityError::Model(format!("Tokenization failed: {e}")))?;

        let seq_len = encoding.get_ids().len().min(self.config.max_position_embeddings);
        let input_ids = Tensor::new(&encoding.get_ids()[..seq_len], &self.device)?.unsqueeze(0)?;
        let token_type_ids =
            Tensor::new(&encoding.get_type_ids()[..seq_len], &self.device)?.unsqueeze(0)?;

        let mut hidden = self.embeddings.forward(&input_ids, &token_type_ids)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden)?;
        }

        // Mean pool over tokens, then L2 normalize
        let pooled = hidden.mean(1)?.squeeze(0)?;
        let norm = pooled.sqr()?.sum_all()?.sqrt()?;
        let normalized = pooled.broadcast_div(&(norm + 1e-12)?)?;

        Ok(normalized.to_vec1::<f32>()?)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl Embedder for SentenceEncoder {
    type Matrix = DenseMatrix;
    type Query = Vec<f32>;

    fn dimension(&self) -> usize {
        self.config.hidden_size
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.encode(text)
    }

    fn embed_corpus<S: AsRef<str>>(&self, texts: &[S]) -> Result<DenseMatrix> {
        tracing::info!(texts = texts.len(), "encoding corpus");
        embed_dense(self.dimension(), texts, |t| self.encode(t))
    }
}

fn require_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(SimilarityError::Model(format!("{} not found at {}", name, path.display())));
    }
    Ok(path)
}
