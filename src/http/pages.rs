//! HTML pages. All markup is static apart from the file listing, whose
//! entries are escaped before rendering.

use axum::response::Html;
use uuid::Uuid;

const STYLE: &str = r#"
            body {
                font-family: Arial, sans-serif;
                background-color: #f2f2f2;
                margin: 0;
                padding: 0;
                display: flex;
                justify-content: center;
                align-items: center;
                min-height: 100vh;
            }
            .container {
                background-color: white;
                padding: 20px;
                border-radius: 10px;
                box-shadow: 0 0 10px rgba(0, 0, 0, 0.1);
                width: 400px;
                text-align: center;
            }
            h1, h3 { color: #333; }
            label { display: block; text-align: left; margin-bottom: 10px; }
            input[type="text"] {
                width: 100%;
                padding: 8px;
                border: 1px solid #ddd;
                border-radius: 5px;
                box-sizing: border-box;
            }
            input[type="submit"], button {
                background-color: #4CAF50;
                color: white;
                padding: 10px 20px;
                border: none;
                border-radius: 5px;
                cursor: pointer;
                margin-top: 10px;
            }
            input[type="submit"]:hover, button:hover { background-color: #45a049; }
            ul { list-style-type: none; padding: 0; }
            li { margin: 5px 0; }
            a { text-decoration: none; color: #4CAF50; font-weight: bold; }
            code { font-size: 0.85em; }
            #waitMessage { margin-top: 20px; color: #555; }
"#;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html>
    <head>
        <meta charset="utf-8">
        <title>{title}</title>
        <style>{STYLE}</style>
    </head>
    <body>
        <div class="container">
{body}
        </div>
    </body>
</html>
"#
    ))
}

pub async fn index() -> Html<String> {
    page(
        "Scene Optimisation Bot",
        r#"            <h1>Scene Optimisation Bot</h1>
            <form action="/process" method="post" enctype="multipart/form-data"
                  onsubmit="document.getElementById('waitMessage').innerText =
                      'Uploading, please keep this page open.'">
                <label>Video File <input type="file" name="video_file" required></label>
                <label>Clips (zip)
                    <input type="file" name="clips_folder" accept=".zip" required></label>
                <label>MP3 File <input type="file" name="mp3_file" required></label>
                <label>Text File <input type="file" name="text_file" required></label>
                <label>TTF Font File <input type="file" name="font_file" required></label>
                <label>Font Size <input type="text" name="font_size" required></label>
                <label>Font Color <input type="text" name="font_color" required></label>
                <label>Background Color <input type="text" name="bg_color" required></label>
                <label>Box Margin <input type="text" name="margin" required></label>
                <input type="submit" value="Process">
            </form>
            <h3 id="waitMessage"></h3>"#,
    )
}

/// Page returned once an upload has been staged and its job started.
pub fn confirmation(job_id: &Uuid, listing_href: &str) -> Html<String> {
    page(
        "Processing",
        &format!(
            r#"            <h1>Uploaded Successfully</h1>
            <p>Job <code>{job_id}</code> is running.</p>
            <h3>Open the download page and refresh it until your files appear.</h3>
            <a href="{href}">Download &rarr;</a>"#,
            href = htmlescape::encode_minimal(listing_href),
        ),
    )
}

/// Listing of `files`, each linked under `href_prefix`.
pub fn listing(files: &[String], href_prefix: &str) -> Html<String> {
    let items: String = files
        .iter()
        .map(|file| {
            format!(
                "                <li><a href=\"{}{}\" download>{}</a></li>\n",
                htmlescape::encode_minimal(href_prefix),
                urlencoding::encode(file),
                htmlescape::encode_minimal(file)
            )
        })
        .collect();

    page(
        "Download Files",
        &format!(
            r#"            <h1>Available Files</h1>
            <p>Keep refreshing this page, generated files show up here as they are written.</p>
            <ul id="fileList">
{items}            </ul>
            <button onclick="document.querySelectorAll('#fileList a')
                .forEach(function (a) {{ a.click(); }})">Download All</button>"#
        ),
    )
}
