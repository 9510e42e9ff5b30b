use super::*;
use crate::kernel::Filter;

fn gray_rows(rows: &[&[u8]]) -> Vec<RowBuffer> {
    rows.iter().map(|row| row.to_vec()).collect()
}

#[test]
fn uniform_field_is_unchanged_by_smooth() {
    let mut rows = vec![vec![100u8; 5]; 5];
    ConvolutionEngine::new(ChannelCount::Gray).apply(&mut rows, Filter::Smooth.kernel());

    assert_eq!(rows, vec![vec![100u8; 5]; 5]);
}

#[test]
fn blur_spreads_single_bright_pixel() {
    let mut rows = vec![vec![0u8; 4]; 4];
    rows[2][2] = 255;

    ConvolutionEngine::new(ChannelCount::Gray).apply(&mut rows, Filter::Blur.kernel());

    // Weights 1/16, 2/16, 4/16 of 255, truncated.
    let expected = gray_rows(&[
        &[0, 0, 0, 0],
        &[0, 15, 31, 0],
        &[0, 31, 63, 0],
        &[0, 0, 0, 0],
    ]);
    assert_eq!(rows, expected);
}

#[test]
fn border_rows_and_columns_are_untouched() {
    let mut rows: Vec<RowBuffer> = (0..6u8)
        .map(|y| (0..7u8).map(|x| y * 17 + x * 5).collect())
        .collect();
    let original = rows.clone();

    ConvolutionEngine::new(ChannelCount::Gray).apply(&mut rows, Filter::Sharpen.kernel());

    assert_eq!(rows[0], original[0]);
    assert_eq!(rows[5], original[5]);
    for (row, before) in rows.iter().zip(&original) {
        assert_eq!(row[0], before[0]);
        assert_eq!(row[6], before[6]);
    }
}

#[test]
fn reads_never_see_this_pass_results() {
    let mut rows = gray_rows(&[
        &[10, 10, 10],
        &[20, 20, 20],
        &[30, 30, 30],
        &[40, 40, 40],
    ]);

    ConvolutionEngine::new(ChannelCount::Gray).apply(&mut rows, Filter::Emboss.kernel());

    // above - below = -20 on both interior rows, wrapped.
    assert_eq!(rows[1][1], 236);
    assert_eq!(rows[2][1], 236);
}

#[test]
fn channels_are_filtered_independently() {
    let pixel = [90u8, 0, 180];
    let mut rows = vec![pixel.repeat(3); 3];
    rows[1][4] = 9; // green sample of the center pixel

    ConvolutionEngine::new(ChannelCount::Rgb).apply(&mut rows, Filter::Smooth.kernel());

    assert_eq!(&rows[1][3..6], &[90, 1, 180]);
    assert_eq!(&rows[1][0..3], &pixel);
    assert_eq!(&rows[1][6..9], &pixel);
}

#[test]
fn too_small_bands_are_left_alone() {
    let mut short = vec![vec![7u8; 4]; 2];
    let mut narrow = vec![vec![7u8; 2]; 4];
    let mut engine = ConvolutionEngine::new(ChannelCount::Gray);

    engine.apply(&mut short, Filter::Mean.kernel());
    engine.apply(&mut narrow, Filter::Mean.kernel());

    assert_eq!(short, vec![vec![7u8; 4]; 2]);
    assert_eq!(narrow, vec![vec![7u8; 2]; 4]);
}

#[test]
fn scratch_is_reused_across_band_sizes() {
    let mut engine = ConvolutionEngine::new(ChannelCount::Gray);
    let mut big = vec![vec![50u8; 6]; 6];
    let mut small = vec![vec![80u8; 3]; 3];

    engine.apply(&mut big, Filter::Blur.kernel());
    engine.apply(&mut small, Filter::Blur.kernel());

    assert_eq!(big, vec![vec![50u8; 6]; 6]);
    assert_eq!(small, vec![vec![80u8; 3]; 3]);
}
