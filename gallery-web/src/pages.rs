use gallery_core::validation::{max_file_size_mb, ALLOWED_EXTENSIONS};
use gallery_core::GalleryImage;

use crate::flash::Flash;

const BASE_STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            background: #ffffff;
            color: #333;
            line-height: 1.6;
        }

        .header {
            padding: 40px 20px;
            text-align: center;
            border-bottom: 1px solid #eee;
        }

        .header h1 {
            font-size: 2.5rem;
            font-weight: 300;
            margin-bottom: 10px;
        }

        .header nav a {
            color: #333;
            text-decoration: none;
            border-bottom: 1px solid #333;
            margin: 0 10px;
        }

        .flash {
            max-width: 800px;
            margin: 20px auto 0;
            padding: 12px 20px;
            border-radius: 4px;
        }

        .flash.success {
            background: #e8f5e9;
            color: #1b5e20;
        }

        .flash.error {
            background: #ffebee;
            color: #b71c1c;
        }
"#;

pub fn gallery_html(images: &[GalleryImage], flash: Option<&Flash>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>S3 Gallery</title>
    <style>{base_style}
        .gallery-container {{
            max-width: 1400px;
            margin: 0 auto;
            padding: 40px 20px;
        }}

        .grid {{
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
            gap: 20px;
        }}

        .tile {{
            background: #f5f5f5;
            border-radius: 4px;
            overflow: hidden;
            transition: transform 0.2s ease;
        }}

        .tile:hover {{
            transform: translateY(-4px);
            box-shadow: 0 8px 20px rgba(0,0,0,0.1);
        }}

        .tile img {{
            display: block;
            width: 100%;
            height: 220px;
            object-fit: cover;
        }}

        .tile .meta {{
            padding: 10px;
            font-size: 0.8rem;
            color: #666;
            word-break: break-all;
        }}

        .empty {{
            text-align: center;
            color: #666;
            padding: 60px 0;
        }}
    </style>
</head>
<body>
    <div class="header">
        <h1>S3 Gallery</h1>
        <p>{image_count} images</p>
        <nav><a href="/">Gallery</a><a href="/upload">Upload</a></nav>
    </div>
    {flash}
    <div class="gallery-container">
        {content}
    </div>
</body>
</html>"#,
        base_style = BASE_STYLE,
        image_count = images.len(),
        flash = flash_html(flash),
        content = if images.is_empty() {
            r#"<p class="empty">No images yet. <a href="/upload">Upload the first one.</a></p>"#
                .to_string()
        } else {
            format!(r#"<div class="grid">{}</div>"#, tiles_html(images))
        },
    )
}

fn tiles_html(images: &[GalleryImage]) -> String {
    images
        .iter()
        .map(|image| {
            format!(
                r#"<div class="tile">
                <a href="{url}" target="_blank"><img src="{url}" alt="{filename}" loading="lazy"></a>
                <div class="meta">{filename}<br>{size} &middot; {last_modified}</div>
            </div>"#,
                url = html_escape(&image.url),
                filename = html_escape(&image.filename),
                size = format_size(image.size),
                last_modified = image.last_modified,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn upload_html(flash: Option<&Flash>) -> String {
    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Upload - S3 Gallery</title>
    <style>{base_style}
        form {{
            max-width: 500px;
            margin: 40px auto;
            padding: 30px;
            border: 1px solid #eee;
            border-radius: 4px;
            text-align: center;
        }}

        input[type=file] {{
            margin: 20px 0;
        }}

        button {{
            background: #333;
            color: #fff;
            border: none;
            padding: 12px 30px;
            cursor: pointer;
            font-size: 1rem;
            border-radius: 4px;
        }}

        .hint {{
            font-size: 0.85rem;
            color: #666;
        }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Upload an image</h1>
        <nav><a href="/">Gallery</a><a href="/upload">Upload</a></nav>
    </div>
    {flash}
    <form method="post" action="/upload" enctype="multipart/form-data">
        <input type="file" name="file" accept="{accept}" required>
        <p class="hint">Allowed: {allowed}. Maximum size {max_mb}MB.</p>
        <p><button type="submit">Upload</button></p>
    </form>
</body>
</html>"#,
        base_style = BASE_STYLE,
        flash = flash_html(flash),
        accept = accept,
        allowed = ALLOWED_EXTENSIONS.join(", ").to_uppercase(),
        max_mb = max_file_size_mb(),
    )
}

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(flash) => format!(
            r#"<div class="flash {category}">{message}</div>"#,
            category = flash.category.as_str(),
            message = html_escape(&flash.message),
        ),
        None => String::new(),
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KIB {
        format!("{bytes} B")
    } else if bytes_f < KIB * KIB {
        format!("{:.1} KB", bytes_f / KIB)
    } else {
        format!("{:.1} MB", bytes_f / (KIB * KIB))
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn not_found_html() -> String {
    error_html("404", "Page Not Found", "The page you are looking for doesn't exist.", None)
}

pub fn server_error_html(detail: Option<&str>) -> String {
    error_html("500", "Server Error", "Something went wrong on our side.", detail)
}

fn error_html(code: &str, title: &str, message: &str, detail: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
            background: #ffffff;
            color: #333;
        }}
        .container {{
            text-align: center;
            padding: 40px 20px;
            max-width: 500px;
        }}
        h1 {{
            font-size: 6rem;
            font-weight: 300;
            margin: 0;
            color: #999;
        }}
        p {{
            font-size: 1.2rem;
            margin: 20px 0;
            color: #666;
        }}
        pre {{
            text-align: left;
            font-size: 0.8rem;
            white-space: pre-wrap;
        }}
        a {{
            color: #333;
            text-decoration: none;
            border-bottom: 1px solid #333;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{code}</h1>
        <p>{message}</p>
        {detail}
        <p><a href="/">Return to the gallery</a></p>
    </div>
</body>
</html>"#,
        title = title,
        code = code,
        message = message,
        detail = detail
            .map(|d| format!("<pre>{}</pre>", html_escape(d)))
            .unwrap_or_default(),
    )
}
