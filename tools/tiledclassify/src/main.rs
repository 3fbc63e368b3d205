use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use classify::{ClassificationOptions, Classifier, FeatureMatrix, LabelRange, OutputSink, PredictionError, RangeClassifier, TileSize, ndi};
use env_logger::{Env, TimestampPrecision};
use geo::{ArrayDataType, GdalRaster, Raster};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use inf::ProgressNotification;
use strum::EnumString;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab_case")]
pub enum ClassifierKind {
    /// Label ranges on the value of a feature column
    Range,
    /// The value of the feature column is the label
    Feature,
}

#[derive(Parser, Debug)]
#[clap(name = "tiledclassify", about = "Classify a multi band raster tile by tile")]
pub struct Opt {
    #[arg(long = "input", short = 'i')]
    pub input: PathBuf,

    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    #[arg(long = "tile-size", value_name = "WxH", default_value = "256x256")]
    pub tile_size: TileSize,

    /// Pixels of the first band at or below this value are not classified
    #[arg(long = "nodata", allow_negative_numbers = true)]
    pub nodata: Option<f64>,

    #[arg(long = "output-nodata", allow_negative_numbers = true)]
    pub output_nodata: Option<f64>,

    #[arg(long = "output-type", value_name = "byte|uint16|int16|uint32|int32|float32|float64")]
    pub output_type: Option<ArrayDataType>,

    #[arg(long = "max-bands")]
    pub max_bands: Option<usize>,

    /// Append the normalized difference of two bands as a feature, e.g. 4,3 for NDVI of a RGBN raster
    #[arg(long = "ndi", value_name = "A,B", value_parser = parse_band_pair)]
    pub ndi: Vec<ndi::BandPair>,

    /// Add the normalized difference of every band pair
    #[arg(long = "all-ndi", conflicts_with = "ndi")]
    pub all_ndi: bool,

    #[arg(long = "classifier", value_name = "range|feature", default_value = "range")]
    pub classifier: ClassifierKind,

    /// Feature column used by the classifier, the ndi columns follow the band columns
    #[arg(long = "column", default_value_t = 0)]
    pub column: usize,

    /// Label range in the form min:max:label, the range includes min and excludes max
    #[arg(long = "range", value_name = "MIN:MAX:LABEL", value_parser = parse_label_range, allow_hyphen_values = true)]
    pub ranges: Vec<LabelRange>,

    /// Label of values that are not in any range
    #[arg(long = "default-label", default_value_t = 0.0, allow_negative_numbers = true)]
    pub default_label: f64,

    #[arg(long = "noprogress")]
    pub no_progress: bool,
}

fn parse_band_pair(s: &str) -> std::result::Result<ndi::BandPair, String> {
    ndi::parse_band_pair(s).map_err(|err| err.to_string())
}

fn parse_label_range(s: &str) -> std::result::Result<LabelRange, String> {
    let values = s
        .split(':')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| format!("Invalid label range '{s}': {err}"))?;

    match values.as_slice() {
        &[min, max, label] if min < max => Ok(LabelRange::new(min, max, label)),
        &[_, _, _] => Err(format!("Invalid label range '{s}': min must be smaller than max")),
        _ => Err(format!("Invalid label range '{s}', expected MIN:MAX:LABEL")),
    }
}

/// Passes the value of a feature column through as label
struct FeatureClassifier {
    column: usize,
}

impl Classifier for FeatureClassifier {
    fn predict(&self, features: &FeatureMatrix) -> std::result::Result<Vec<f64>, PredictionError> {
        features.column(self.column).ok_or(PredictionError::ColumnCount {
            expected: self.column.saturating_add(1),
            actual: features.columns(),
        })
    }
}

/// Tile progress on a progress bar
struct ProgressBarNotification {
    bar: Option<ProgressBar>,
}

impl ProgressNotification for ProgressBarNotification {
    fn reset(&mut self, total: u64) {
        if let Some(bar) = &self.bar {
            bar.set_length(total);
            bar.set_position(0);
        }
    }

    fn tick(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

fn create_classifier(opt: &Opt) -> Result<Box<dyn Classifier>> {
    Ok(match opt.classifier {
        ClassifierKind::Range => {
            if opt.ranges.is_empty() {
                bail!("The range classifier needs at least one --range");
            }

            Box::new(RangeClassifier::new(opt.column, opt.ranges.clone(), opt.default_label))
        }
        ClassifierKind::Feature => Box::new(FeatureClassifier { column: opt.column }),
    })
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .build();

    let multi = MultiProgress::new();
    let level = logger.filter();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);

    let gdal_config = geo::RuntimeConfiguration::builder()
        .config_options(vec![("GDAL_DISABLE_READDIR_ON_OPEN".into(), "YES".into())])
        .build();
    gdal_config.apply().context("Failed to configure GDAL")?;

    let input = GdalRaster::open_read_only(&opt.input).with_context(|| format!("Failed to open {}", opt.input.display()))?;
    let classifier = create_classifier(&opt)?;

    let band_combinations = if opt.all_ndi {
        let band_count = opt.max_bands.map_or(input.band_count(), |max| max.min(input.band_count()));
        ndi::all_band_combinations(band_count)
    } else {
        opt.ndi.clone()
    };

    let options = ClassificationOptions {
        tile_size: opt.tile_size,
        input_nodata: opt.nodata,
        output_nodata: opt.output_nodata,
        output_data_type: opt.output_type,
        max_bands: opt.max_bands,
        band_combinations,
    };

    let mut progress = ProgressBarNotification {
        bar: (!opt.no_progress).then(|| multi.add(ProgressBar::new(0))),
    };

    let (output, summary) = classify::classify_raster(&input, classifier.as_ref(), &options, &mut progress, |desc, data_type, nodata| {
        OutputSink::create(&opt.output, desc, data_type, nodata)
    })?;
    drop(output);

    if let Some(bar) = &progress.bar {
        bar.finish_with_message("Classification done");
    }

    log::info!("Classified {}: {summary}", opt.output.display());
    if let Some(stats) = &summary.statistics {
        log::info!("Output statistics: {stats}");
    }

    Ok(())
}
