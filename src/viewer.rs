//! Native window that displays a rendered chart until the user closes it.

use eframe::egui;
use thiserror::Error;

use crate::models::ChartImage;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Chart window failed: {0}")]
    Window(String),
}

/// Open a window showing the chart; blocks until it is closed
pub fn show_chart(image: ChartImage, title: &str) -> Result<(), ViewerError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([image.width as f32 + 16.0, image.height as f32 + 16.0]),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(ChartWindow::new(image)))),
    )
    .map_err(|e| ViewerError::Window(e.to_string()))
}

struct ChartWindow {
    // Uploaded to the GPU on the first frame
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
}

impl ChartWindow {
    fn new(image: ChartImage) -> Self {
        let size = [image.width as usize, image.height as usize];
        Self {
            pending: Some(egui::ColorImage::from_rgb(size, &image.pixels)),
            texture: None,
        }
    }
}

impl eframe::App for ChartWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(image) = self.pending.take() {
            self.texture = Some(ctx.load_texture("price-chart", image, egui::TextureOptions::LINEAR));
        }

        egui::CentralPanel::default().show(ctx, |ui| match &self.texture {
            Some(texture) => {
                ui.add(egui::Image::new(egui::load::SizedTexture::from_handle(texture)).shrink_to_fit());
            }
            None => {
                ui.label("Rendering chart...");
            }
        });
    }
}
