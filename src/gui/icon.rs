// Icone d'ampoule dessinee a la volee : globe jaune (ou gris si eteinte)
// avec un culot rectangulaire, sur fond transparent.
// Converti au format attendu par chaque systray.

use image::{Rgba, RgbaImage};

pub const ICON_SIZE: u32 = 64;

const WARM_YELLOW: Rgba<u8> = Rgba([255, 220, 100, 255]);
const UNLIT_GREY: Rgba<u8> = Rgba([190, 190, 190, 255]);
const OUTLINE: Rgba<u8> = Rgba([100, 100, 100, 255]);

/// Dessine l'ampoule sur une grille 64x64
pub fn bulb(lit: bool) -> RgbaImage {
    let fill = if lit { WARM_YELLOW } else { UNLIT_GREY };

    // Globe : cercle de diametre 32 a (16, 12), culot : 16x8 a (24, 44)
    let (cx, cy, radius) = (32.0_f32, 28.0_f32, 16.0_f32);

    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance <= radius - 1.0 {
            fill
        } else if distance <= radius {
            OUTLINE
        } else if (24..40).contains(&x) && (44..52).contains(&y) {
            let border = x == 24 || x == 39 || y == 51;
            if border {
                OUTLINE
            } else {
                fill
            }
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Icone de la fenetre egui
pub fn window_icon(lit: bool) -> eframe::egui::IconData {
    let img = bulb(lit);
    let (width, height) = img.dimensions();
    eframe::egui::IconData {
        rgba: img.into_raw(),
        width,
        height,
    }
}

/// Icone du systray Windows
#[cfg(windows)]
pub fn tray_icon(lit: bool) -> Option<tray_icon::Icon> {
    let img = bulb(lit);
    let (width, height) = img.dimensions();
    match tray_icon::Icon::from_rgba(img.into_raw(), width, height) {
        Ok(icon) => Some(icon),
        Err(e) => {
            tracing::error!("{}", crate::t!("gui.icon_failed", e));
            None
        }
    }
}

/// Icone StatusNotifierItem : pixels ARGB32 dans l'ordre reseau
#[cfg(target_os = "linux")]
pub fn tray_pixmap(lit: bool) -> ksni::Icon {
    let img = bulb(lit);
    let (width, height) = img.dimensions();
    let data = img
        .pixels()
        .flat_map(|Rgba([r, g, b, a])| [*a, *r, *g, *b])
        .collect();
    ksni::Icon {
        width: width as i32,
        height: height as i32,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_globe_and_base_on_transparent_background() {
        let lit = bulb(true);
        assert_eq!(lit.dimensions(), (ICON_SIZE, ICON_SIZE));
        assert_eq!(*lit.get_pixel(32, 28), WARM_YELLOW);
        assert_eq!(*lit.get_pixel(31, 47), WARM_YELLOW);
        assert_eq!(lit.get_pixel(0, 0)[3], 0);
        assert_eq!(lit.get_pixel(63, 63)[3], 0);
    }

    #[test]
    fn unlit_bulb_is_grey() {
        let unlit = bulb(false);
        assert_eq!(*unlit.get_pixel(32, 28), UNLIT_GREY);
    }

    #[test]
    fn window_icon_has_rgba_buffer() {
        let icon = window_icon(true);
        assert_eq!(icon.width, ICON_SIZE);
        assert_eq!(icon.rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn tray_pixmap_puts_alpha_first() {
        let pixmap = tray_pixmap(true);
        assert_eq!((pixmap.width, pixmap.height), (64, 64));
        let centre = ((28 * ICON_SIZE + 32) * 4) as usize;
        assert_eq!(&pixmap.data[centre..centre + 4], &[255, 255, 220, 100]);
        // coin transparent
        assert_eq!(pixmap.data[0], 0);
    }
}
