use std::fs;
use std::path::Path;

const FALLBACK_INDEX: &str = "<!DOCTYPE html>\n<html lang=\"es\"><head><meta charset=\"utf-8\"><title>Panel de Administración</title></head>\n<body><p>El frontend no ha sido compilado. Ejecuta <code>trunk build</code> en <code>frontend/</code>.</p></body></html>\n";

fn main() {
    let out_dir = Path::new("static");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.exists() {
        let _ = fs::remove_dir_all(out_dir);
        fs::create_dir_all(out_dir).unwrap();
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true).copy_inside(true),
        )
            .unwrap();
    }

    // The server embeds static/dist at compile time, so it has to exist even
    // before the frontend has been built once.
    let embedded = out_dir.join("dist");
    fs::create_dir_all(&embedded).unwrap();
    let index = embedded.join("index.html");
    if !index.exists() {
        fs::write(index, FALLBACK_INDEX).unwrap();
    }

    println!("cargo:rerun-if-changed=../frontend/dist");
}
