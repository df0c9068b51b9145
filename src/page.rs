//! The single-page front end.

pub const INDEX_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Cartoonizer</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }

        .container {
            position: relative;
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 1100px;
            width: 100%;
            padding: 40px;
        }

        .powered-by {
            position: absolute;
            top: 16px;
            right: 24px;
            font-size: 0.8em;
            color: #999;
        }

        .powered-by a {
            color: #667eea;
            font-weight: 600;
            text-decoration: none;
        }

        h1 {
            color: #333;
            margin-bottom: 10px;
            font-size: 2em;
        }

        .subtitle {
            color: #666;
            margin-bottom: 30px;
            font-size: 0.9em;
        }

        .capture-area {
            border: 3px dashed #667eea;
            border-radius: 15px;
            padding: 30px 20px;
            text-align: center;
            background: #f8f9ff;
        }

        .capture-area video {
            width: 100%;
            max-width: 480px;
            border-radius: 10px;
            background: #222;
            margin-bottom: 20px;
        }

        .capture-area.dragover {
            border-color: #764ba2;
            background: #e8ebff;
        }

        .upload-hint {
            color: #999;
            font-size: 0.9em;
            margin-top: 10px;
        }

        input[type="file"] {
            display: none;
        }

        button {
            background: #667eea;
            color: white;
            border: none;
            padding: 10px 22px;
            border-radius: 20px;
            font-size: 0.95em;
            font-weight: 600;
            cursor: pointer;
            margin: 4px;
        }

        button.secondary {
            background: #f8f9ff;
            color: #667eea;
            border: 2px solid #667eea;
        }

        button:disabled {
            opacity: 0.5;
            cursor: default;
        }

        .controls {
            display: none;
            margin-top: 25px;
            padding: 20px;
            background: #f8f9ff;
            border-radius: 10px;
        }

        .controls label {
            display: block;
            color: #667eea;
            font-weight: 600;
            font-size: 0.9em;
            margin-bottom: 8px;
        }

        .controls input[type="range"] {
            width: 100%;
        }

        .controls details {
            margin-top: 15px;
        }

        .controls input[type="text"] {
            width: 100%;
            padding: 8px 12px;
            margin-top: 8px;
            border: 2px solid #e0e0e0;
            border-radius: 8px;
        }

        .results {
            display: none;
            grid-template-columns: 1fr 1fr;
            gap: 20px;
            margin-top: 25px;
        }

        .result-label {
            color: #667eea;
            font-weight: 600;
            margin-bottom: 10px;
            font-size: 0.9em;
            text-transform: uppercase;
            letter-spacing: 1px;
        }

        .results img {
            width: 100%;
            border-radius: 10px;
            box-shadow: 0 4px 15px rgba(0,0,0,0.1);
        }

        .meta-info {
            display: flex;
            justify-content: space-between;
            margin-top: 15px;
            padding-top: 15px;
            border-top: 1px solid #e0e0e0;
            font-size: 0.85em;
            color: #666;
        }

        .loading {
            text-align: center;
            padding: 40px;
            display: none;
        }

        .spinner {
            border: 4px solid #f3f3f3;
            border-top: 4px solid #667eea;
            border-radius: 50%;
            width: 50px;
            height: 50px;
            animation: spin 1s linear infinite;
            margin: 0 auto 20px;
        }

        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }

        .error {
            background: #fee;
            border: 2px solid #fcc;
            color: #c33;
            padding: 15px;
            border-radius: 10px;
            margin-top: 20px;
            display: none;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="powered-by">Powered by <a href="https://octoai.cloud/">OctoAI</a></div>
        <h1>🤩 Cartoonizer</h1>
        <p class="subtitle">Take a picture and turn yourself into a cartoon character. Works best on close-up portraits.</p>

        <div class="capture-area" id="captureArea">
            <video id="camera" autoplay playsinline muted></video>
            <div>
                <button id="snapButton">📸 Take a picture!</button>
                <button class="secondary" id="uploadButton">Upload a photo</button>
            </div>
            <div class="upload-hint">or drag an image here • JPG, PNG</div>
            <input type="file" id="fileInput" accept="image/png,image/jpeg">
        </div>

        <div class="controls" id="controls">
            <label for="strength">🧠 Imagination: <span id="strengthValue">4</span>
                (lower: closer to original, higher: more imaginative result)</label>
            <input type="range" id="strength" min="3" max="10" value="4">
            <details>
                <summary>Add more context to customize the output</summary>
                <input type="text" id="context" placeholder="e.g. wearing a wizard hat">
            </details>
            <div style="margin-top: 15px;">
                <button id="variationButton">Generate New Variation!</button>
                <button class="secondary" id="restartButton">Start over</button>
            </div>
        </div>

        <div class="loading" id="loading">
            <div class="spinner"></div>
            <p>Cartoonizing...</p>
        </div>

        <div class="error" id="error"></div>

        <div class="results" id="results">
            <div>
                <div class="result-label">Original Image 📷</div>
                <img id="originalImage" alt="Original">
            </div>
            <div>
                <div class="result-label">Transformed Image 🌟</div>
                <a id="downloadLink" download="cartoonized_marked.png"><img id="cartoonImage" alt="Cartoon"></a>
                <div class="meta-info">
                    <span>Prompt: <em id="promptText"></em></span>
                    <span>Seed <strong id="seedText">0</strong> • <strong id="processingTime">--</strong>ms</span>
                </div>
            </div>
        </div>
    </div>

    <canvas id="snapshot" style="display: none;"></canvas>

    <script>
        const captureArea = document.getElementById('captureArea');
        const camera = document.getElementById('camera');
        const snapshot = document.getElementById('snapshot');
        const snapButton = document.getElementById('snapButton');
        const uploadButton = document.getElementById('uploadButton');
        const fileInput = document.getElementById('fileInput');
        const controls = document.getElementById('controls');
        const strength = document.getElementById('strength');
        const strengthValue = document.getElementById('strengthValue');
        const context = document.getElementById('context');
        const variationButton = document.getElementById('variationButton');
        const restartButton = document.getElementById('restartButton');
        const loading = document.getElementById('loading');
        const errorDiv = document.getElementById('error');
        const results = document.getElementById('results');

        let photo = null;
        let stream = null;

        async function startCamera() {
            if (!navigator.mediaDevices || !navigator.mediaDevices.getUserMedia) {
                camera.style.display = 'none';
                snapButton.style.display = 'none';
                return;
            }
            try {
                stream = await navigator.mediaDevices.getUserMedia({ video: { facingMode: 'user' } });
                camera.srcObject = stream;
                camera.style.display = 'inline-block';
                snapButton.style.display = 'inline-block';
            } catch (e) {
                camera.style.display = 'none';
                snapButton.style.display = 'none';
            }
        }

        function stopCamera() {
            if (stream) {
                stream.getTracks().forEach((t) => t.stop());
                stream = null;
            }
        }

        snapButton.addEventListener('click', () => {
            snapshot.width = camera.videoWidth;
            snapshot.height = camera.videoHeight;
            snapshot.getContext('2d').drawImage(camera, 0, 0);
            snapshot.toBlob((blob) => usePhoto(blob), 'image/png');
        });

        uploadButton.addEventListener('click', () => fileInput.click());

        fileInput.addEventListener('change', (e) => {
            const file = e.target.files[0];
            if (file) {
                usePhoto(file);
            }
        });

        captureArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            captureArea.classList.add('dragover');
        });

        captureArea.addEventListener('dragleave', () => {
            captureArea.classList.remove('dragover');
        });

        captureArea.addEventListener('drop', (e) => {
            e.preventDefault();
            captureArea.classList.remove('dragover');
            const file = e.dataTransfer.files[0];
            if (file && file.type.startsWith('image/')) {
                usePhoto(file);
            }
        });

        strength.addEventListener('input', () => {
            strengthValue.textContent = strength.value;
        });
        strength.addEventListener('change', () => cartoonize(false));
        context.addEventListener('change', () => cartoonize(false));
        variationButton.addEventListener('click', () => cartoonize(true));

        restartButton.addEventListener('click', () => {
            photo = null;
            fileInput.value = '';
            context.value = '';
            strength.value = 4;
            strengthValue.textContent = '4';
            controls.style.display = 'none';
            results.style.display = 'none';
            errorDiv.style.display = 'none';
            captureArea.style.display = 'block';
            startCamera();
        });

        function usePhoto(blob) {
            photo = blob;
            stopCamera();
            captureArea.style.display = 'none';
            controls.style.display = 'block';
            cartoonize(false);
        }

        function setBusy(busy) {
            loading.style.display = busy ? 'block' : 'none';
            variationButton.disabled = busy;
            restartButton.disabled = busy;
            strength.disabled = busy;
            context.disabled = busy;
        }

        async function cartoonize(variation) {
            if (!photo) {
                return;
            }

            setBusy(true);
            errorDiv.style.display = 'none';

            const formData = new FormData();
            formData.append('image', photo, 'photo');
            formData.append('strength', strength.value);
            formData.append('context', context.value);
            if (variation) {
                formData.append('variation', 'true');
            }

            try {
                const response = await fetch('/cartoonize', {
                    method: 'POST',
                    body: formData
                });

                const result = await response.json();
                if (!response.ok) {
                    throw new Error(result.detail || 'Cartoonize failed');
                }

                document.getElementById('originalImage').src = result.original;
                document.getElementById('cartoonImage').src = result.cartoon;
                document.getElementById('downloadLink').href = result.cartoon;
                document.getElementById('promptText').textContent = result.prompt;
                document.getElementById('seedText').textContent = result.seed;
                document.getElementById('processingTime').textContent = result.processing_time_ms;
                results.style.display = 'grid';
            } catch (error) {
                errorDiv.textContent = 'Error: ' + error.message;
                errorDiv.style.display = 'block';
            } finally {
                setBusy(false);
            }
        }

        startCamera();
    </script>
</body>
</html>
"#;
