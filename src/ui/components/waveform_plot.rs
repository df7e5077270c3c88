use egui::{Ui, Color32};
use egui_plot::{Plot, Line, PlotPoints};

/// Line plot of the most recent mixer output
pub struct ScopePlot {
    points: Vec<[f32; 2]>,
    height: f32,
}

const SCOPE_COLOR: Color32 = Color32::from_rgb(0, 188, 212);

impl ScopePlot {
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self {
            points,
            height: 100.0,
        }
    }
    
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
    
    pub fn show(self, ui: &mut Ui, id_source: impl std::hash::Hash) {
        // Fixed y range so a quiet mix looks quiet
        let plot = Plot::new(id_source)
            .height(self.height)
            .show_x(false)
            .show_y(false)
            .include_y(-1.0)
            .include_y(1.0)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);
        
        plot.show(ui, |plot_ui| {
            let plot_points = PlotPoints::from_iter(
                self.points.iter().map(|[x, y]| [*x as f64, *y as f64])
            );
            
            plot_ui.line(Line::new(plot_points).color(SCOPE_COLOR));
        });
    }
}
