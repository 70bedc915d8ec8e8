use image::GrayImage;
use label_render::LabelFont;

use crate::{CellValue, LabelerConfig, QrLabeler, Table};

fn test_labeler() -> QrLabeler {
    QrLabeler::new(&LabelerConfig::default(), LabelFont::builtin(16.0))
}

fn mine_table(rows: Vec<[&str; 3]>) -> Table {
    Table::new(
        vec!["Nivel".into(), "Veta".into(), "Tajo".into()],
        rows.into_iter()
            .map(|row| row.into_iter().map(CellValue::from).collect())
            .collect(),
    )
}

fn decode_qr(img: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32)[0],
    );
    let grid = prepared.detect_grids().into_iter().next()?;
    grid.decode().ok().map(|(_, content)| content)
}
