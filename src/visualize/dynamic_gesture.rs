use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::VisualizerConfig;
use crate::foundation::core::{ExportFormat, Hand};
use crate::foundation::error::{HandvizError, HandvizResult};
use crate::gesture::{GestureSet, read_gesture_file};
use crate::host::{BlenderHost, RunMode, ScriptHost};
use crate::script::{
    DynamicScriptParams, HostScript, ScriptTemplate, dynamic_bindings, dynamic_template,
};
use crate::visualize::absolute_path;
use crate::visualize::report::{BatchReport, SampleOutcome};

/// Animates the armature over each gesture instance of a JSON recording.
///
/// Instances run one after another; the host is not assumed to tolerate concurrent
/// interactive sessions.
pub struct DynamicVisualizer<H: ScriptHost> {
    config: VisualizerConfig,
    host: H,
    template: ScriptTemplate,
}

impl DynamicVisualizer<BlenderHost> {
    pub fn with_blender(config: VisualizerConfig) -> HandvizResult<Self> {
        let host = BlenderHost::discover(config.blender_path.as_deref())?;
        Self::new(config, host)
    }
}

impl<H: ScriptHost> DynamicVisualizer<H> {
    pub fn new(config: VisualizerConfig, host: H) -> HandvizResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            host,
            template: dynamic_template()?,
        })
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// `export = false` opens each instance in the host UI instead of saving a `.blend`.
    #[tracing::instrument(skip(self))]
    pub fn visualize_file(&self, path: &Path, export: bool) -> HandvizResult<BatchReport> {
        let set = read_gesture_file(path)?;
        tracing::info!(
            label = %set.label,
            hand = %set.hand,
            instances = set.entries.len(),
            "parsed gesture file"
        );
        self.visualize_set(&set, export)
    }

    pub fn visualize_set(&self, set: &GestureSet, export: bool) -> HandvizResult<BatchReport> {
        let output_dir = absolute_path(&self.config.dynamic_output_dir)?;
        if export {
            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("failed to create output directory '{}'", output_dir.display())
            })?;
        }
        let mode = if export {
            RunMode::Background
        } else {
            RunMode::Interactive
        };

        let mut outcomes = Vec::with_capacity(set.entries.len());
        for index in 0..set.entries.len() {
            let span = tracing::info_span!("gesture", index);
            let _enter = span.enter();

            let blend_path = output_dir.join(dynamic_file_name(&set.label, set.hand, index));
            let result = self
                .script_for(set, index, export, &blend_path)
                .and_then(|script| self.host.run(&script, mode))
                .map(|()| if export { vec![blend_path] } else { Vec::new() });

            match &result {
                Ok(_) => tracing::info!("gesture done"),
                Err(e) => tracing::warn!(error = %e, "gesture failed"),
            }
            outcomes.push(SampleOutcome {
                index,
                result,
                png: None,
            });
        }

        let report = BatchReport {
            label: set.label.clone(),
            hand: set.hand,
            outcomes,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "dynamic batch finished"
        );
        Ok(report)
    }

    /// The script gesture instance `index` would run with, without launching the host.
    pub fn render_script(
        &self,
        set: &GestureSet,
        index: usize,
        export: bool,
    ) -> HandvizResult<HostScript> {
        let output_dir = absolute_path(&self.config.dynamic_output_dir)?;
        let blend_path = output_dir.join(dynamic_file_name(&set.label, set.hand, index));
        self.script_for(set, index, export, &blend_path)
    }

    fn script_for(
        &self,
        set: &GestureSet,
        index: usize,
        export: bool,
        blend_path: &Path,
    ) -> HandvizResult<HostScript> {
        let entry = set.entries.get(index).ok_or_else(|| {
            HandvizError::validation(format!(
                "gesture {index} out of range ({} instances)",
                set.entries.len()
            ))
        })?;
        let timeline = entry.timeline();
        let fbx_path: PathBuf = absolute_path(&self.config.fbx_model_path(set.hand))?;
        let params = DynamicScriptParams {
            label: &set.label,
            hand: set.hand,
            export,
            blend_path,
            fbx_path: &fbx_path,
            timeline: &timeline,
        };
        self.template.render(&dynamic_bindings(&params)?)
    }
}

/// `dynamic_{label}_{hand}_{iteration}.blend`
pub fn dynamic_file_name(label: &str, hand: Hand, iteration: usize) -> String {
    format!(
        "dynamic_{label}_{hand}_{iteration}.{}",
        ExportFormat::Blend
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_matches_convention() {
        assert_eq!(dynamic_file_name("z", Hand::Right, 3), "dynamic_z_Right_3.blend");
    }
}
