use bytesize::ByteSize;
use std::time::Duration;
use texprep_ktx2::Ktx2Layout;
use texprep_metadata::DecodedMetadata;
use texprep_pipeline::TextureReport;

/// One line summarizing a processed texture.
pub fn describe_report(report: &TextureReport) -> String {
    let mut line = format!(
        "{} -> {} ({:?}, {} levels, {})",
        report.source.display(),
        report.output.display(),
        report.texture_type,
        report.levels,
        ByteSize(report.output_bytes)
    );
    if let Some(normal) = &report.normal_map {
        line.push_str(&format!(", toksvig from {}", normal.display()));
    }
    if let Some(histogram) = &report.histogram {
        line.push_str(&format!(
            ", normalized [{:.3}, {:.3}]",
            histogram.range_low(),
            histogram.range_high()
        ));
    }
    if let Some(dir) = &report.intermediate_dir {
        line.push_str(&format!(", levels kept in {}", dir.display()));
    }
    line
}

/// Human readable dump of a container's layout.
pub fn describe_layout(layout: &Ktx2Layout) -> Vec<String> {
    let mut lines = vec![
        format!("vkFormat: {}", layout.vk_format),
        format!(
            "Size: {}x{}x{}, {} layer(s), {} face(s)",
            layout.pixel_width,
            layout.pixel_height,
            layout.pixel_depth,
            layout.layer_count,
            layout.face_count
        ),
        format!("Supercompression: {}", layout.supercompression_name()),
        format!("DFD: offset {} length {}", layout.dfd.offset, layout.dfd.length),
        format!("KVD: offset {} length {}", layout.kvd.offset, layout.kvd.length),
        format!("SGD: offset {} length {}", layout.sgd.offset, layout.sgd.length),
        format!("Levels: {}", layout.levels.len()),
    ];
    for (index, level) in layout.levels.iter().enumerate() {
        lines.push(format!(
            "  [{index}] offset {} length {} uncompressed {}",
            level.byte_offset, level.byte_length, level.uncompressed_byte_length
        ));
    }
    lines
}

/// Human readable dump of decoded recovery coefficients.
pub fn describe_coefficients(metadata: &DecodedMetadata) -> Vec<String> {
    let coefficients = &metadata.coefficients;
    let mut lines = vec![format!("Block: {:?}", coefficients.block_type())];
    for (channel, (scale, offset)) in ["R", "G", "B", "A"]
        .iter()
        .zip(coefficients.per_channel())
    {
        lines.push(format!("  {channel}: original = normalized * {scale:.6} + {offset:.6}"));
    }
    if let Some(params) = &metadata.params {
        lines.push(format!(
            "Window: [{:.4}, {:.4}], {:?}, {:?}",
            params.range_low, params.range_high, params.histogram_mode, params.channel_mode
        ));
    }
    lines
}

/// Formats bytes over time as a rate.
pub fn format_throughput(bytes: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    let per_second = if seconds > 0.0 {
        (bytes as f64 / seconds) as u64
    } else {
        0
    };
    format!("{}/s", ByteSize(per_second))
}
