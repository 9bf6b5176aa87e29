use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::config::VisualizerConfig;
use crate::foundation::core::{ExportFormat, Hand};
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::host::{BlenderHost, RunMode, ScriptHost};
use crate::postprocess::crop_png_in_place;
use crate::script::{
    HostScript, ScriptTemplate, StaticScriptParams, static_bindings, static_template,
};
use crate::visualize::report::{BatchReport, SampleOutcome};
use crate::visualize::{absolute_path, build_thread_pool};
use crate::wach::{StaticSample, WachDocument, read_wach_file, validate_label};

/// Poses the armature once per WACH sample and exports each pose.
pub struct StaticVisualizer<H: ScriptHost> {
    config: VisualizerConfig,
    host: H,
    template: ScriptTemplate,
}

impl StaticVisualizer<BlenderHost> {
    /// Uses the Blender found by [`crate::host::locate_blender`].
    pub fn with_blender(config: VisualizerConfig) -> HandvizResult<Self> {
        let host = BlenderHost::discover(config.blender_path.as_deref())?;
        Self::new(config, host)
    }
}

impl<H: ScriptHost> StaticVisualizer<H> {
    pub fn new(config: VisualizerConfig, host: H) -> HandvizResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            host,
            template: static_template()?,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Every sample of a `.txt` WACH file.
    #[tracing::instrument(skip(self))]
    pub fn visualize_file(&self, path: &Path, format: ExportFormat) -> HandvizResult<BatchReport> {
        let doc = read_wach_file(path)?;
        tracing::info!(
            label = %doc.label,
            hand = %doc.hand,
            samples = doc.samples.len(),
            "parsed WACH file"
        );
        self.visualize_document(&doc, format)
    }

    /// One literal sample of 20 decimal strings.
    #[tracing::instrument(skip(self, values))]
    pub fn visualize_sample<S: AsRef<str>>(
        &self,
        label: &str,
        hand: Hand,
        values: &[S],
        format: ExportFormat,
    ) -> HandvizResult<BatchReport> {
        validate_label(label)?;
        let doc = WachDocument {
            label: label.to_string(),
            hand,
            samples: vec![StaticSample::from_strs(values)?],
        };
        self.visualize_document(&doc, format)
    }

    /// Runs the host once per sample. A failing sample is recorded and the batch goes on.
    pub fn visualize_document(
        &self,
        doc: &WachDocument,
        format: ExportFormat,
    ) -> HandvizResult<BatchReport> {
        let plan = OutputPlan::prepare(&self.config, doc, format)?;

        let outcomes = if self.config.parallel && doc.samples.len() > 1 {
            let pool = build_thread_pool(self.config.threads)?;
            pool.install(|| {
                doc.samples
                    .par_iter()
                    .enumerate()
                    .map(|(i, s)| self.run_sample(&plan, doc, i, s))
                    .collect::<Vec<_>>()
            })
        } else {
            doc.samples
                .iter()
                .enumerate()
                .map(|(i, s)| self.run_sample(&plan, doc, i, s))
                .collect()
        };

        let report = BatchReport {
            label: doc.label.clone(),
            hand: doc.hand,
            outcomes,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "static batch finished"
        );
        Ok(report)
    }

    /// The script a sample would run with, without launching the host.
    pub fn render_script(
        &self,
        doc: &WachDocument,
        index: usize,
        format: ExportFormat,
    ) -> HandvizResult<HostScript> {
        let sample = doc.samples.get(index).ok_or_else(|| {
            HandvizError::validation(format!(
                "sample {index} out of range ({} samples)",
                doc.samples.len()
            ))
        })?;
        let plan = OutputPlan::resolve(&self.config, doc, format)?;
        self.script_for(&plan, doc, index, sample)
    }

    fn script_for(
        &self,
        plan: &OutputPlan,
        doc: &WachDocument,
        index: usize,
        sample: &StaticSample,
    ) -> HandvizResult<HostScript> {
        let output_paths = plan.output_paths(doc, index);
        let png_path = plan.png_path(doc, index);
        let params = StaticScriptParams {
            label: &doc.label,
            hand: doc.hand,
            sample,
            format: plan.format,
            output_paths: &output_paths,
            fbx_path: &plan.fbx_path,
            png_path: png_path.as_deref(),
        };
        self.template.render(&static_bindings(&params)?)
    }

    fn run_sample(
        &self,
        plan: &OutputPlan,
        doc: &WachDocument,
        index: usize,
        sample: &StaticSample,
    ) -> SampleOutcome {
        let span = tracing::info_span!("sample", index);
        let _enter = span.enter();

        let result = self
            .script_for(plan, doc, index, sample)
            .and_then(|script| self.host.run(&script, RunMode::Background))
            .map(|()| vec![plan.output_paths(doc, index)[&plan.format].clone()]);

        let png = match (&result, plan.png_path(doc, index)) {
            (Ok(_), Some(png)) => Some(
                crop_png_in_place(&png, self.config.crop)
                    .map(|()| png)
                    .inspect_err(|e| tracing::warn!(error = %e, "png post-processing failed")),
            ),
            _ => None,
        };

        match &result {
            Ok(outputs) => tracing::info!(outputs = outputs.len(), "sample exported"),
            Err(e) => tracing::warn!(error = %e, "sample failed"),
        }

        SampleOutcome { index, result, png }
    }
}

/// Absolute output locations for one batch.
struct OutputPlan {
    format: ExportFormat,
    output_dir: PathBuf,
    png_dir: Option<PathBuf>,
    fbx_path: PathBuf,
}

impl OutputPlan {
    fn resolve(
        config: &VisualizerConfig,
        doc: &WachDocument,
        format: ExportFormat,
    ) -> HandvizResult<Self> {
        let png_dir = if config.export_png {
            Some(absolute_path(&config.png_output_dir)?)
        } else {
            None
        };
        Ok(Self {
            format,
            output_dir: absolute_path(&config.static_output_dir)?,
            png_dir,
            fbx_path: absolute_path(&config.fbx_model_path(doc.hand))?,
        })
    }

    /// Like `resolve`, and creates the output directories.
    fn prepare(
        config: &VisualizerConfig,
        doc: &WachDocument,
        format: ExportFormat,
    ) -> HandvizResult<Self> {
        let plan = Self::resolve(config, doc, format)?;
        for dir in std::iter::once(&plan.output_dir).chain(plan.png_dir.as_ref()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        }
        Ok(plan)
    }

    fn output_paths(&self, doc: &WachDocument, index: usize) -> BTreeMap<ExportFormat, PathBuf> {
        ExportFormat::ALL
            .into_iter()
            .map(|f| (f, self.output_dir.join(static_file_name(&doc.label, doc.hand, index, f))))
            .collect()
    }

    fn png_path(&self, doc: &WachDocument, index: usize) -> Option<PathBuf> {
        self.png_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}_{}_{index}.png", doc.label, doc.hand)))
    }
}

/// `{label}_{hand}_{index}_{format}.{format}`
pub fn static_file_name(label: &str, hand: Hand, index: usize, format: ExportFormat) -> String {
    format!("{label}_{hand}_{index}_{format}.{format}")
}
