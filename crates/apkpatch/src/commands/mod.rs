pub mod assemble;
pub mod compare;
pub mod create_patches;
pub mod patch_apply;
pub mod patch_create;
pub mod setup;

use std::path::Path;

use apkpatch_core::format::{FormatConfig, Normalizer};
use apkpatch_core::patch::Progress;

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::toolchain::{
    ApkSigner, Apktool, Assembler, Disassembler, KeyGenerator, Keystore, Keytool, Signer,
};

/// The external tools a workflow command may call.
pub struct Toolchain {
    pub disassembler: Box<dyn Disassembler>,
    pub assembler: Box<dyn Assembler>,
    pub signer: Box<dyn Signer>,
    pub key_generator: Box<dyn KeyGenerator>,
}

impl Toolchain {
    /// apktool, apksigner and keytool as configured.
    pub fn java(config: &WorkflowConfig) -> Self {
        let apktool = Apktool {
            decode_sources: config.decode_sources,
            ..Apktool::new(&config.java, config.apktool_jar())
        };

        Toolchain {
            disassembler: Box::new(apktool.clone()),
            assembler: Box::new(apktool),
            signer: Box::new(ApkSigner::new(&config.java, config.apksigner_jar())),
            key_generator: Box::new(Keytool::new(&config.java)),
        }
    }
}

pub(crate) fn keystore(config: &WorkflowConfig) -> Keystore {
    Keystore {
        path: config.keystore_path(),
        settings: config.keystore.clone(),
    }
}

/// Normalizer for the format config at `path`, or defaults when `None`.
pub(crate) fn normalizer(path: Option<&Path>) -> Result<Normalizer, WorkflowError> {
    let config = match path {
        Some(path) => FormatConfig::load(path)?,
        None => FormatConfig::default(),
    };
    Ok(Normalizer::new(config))
}

pub(crate) fn print_progress(progress: Progress) {
    println!("{}", progress);
}
